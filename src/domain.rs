use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

pub const NO_DATA: &str = "No data available";
pub const NOT_AVAILABLE: &str = "N/A";

pub const HELP_TEXT: &str = "\
fv - campaign finance viewer

  q           quit
  /           search by name (Enter keeps, Esc clears)
  Left/Right  select column
  s, Enter    sort by selected column (again to flip)
  1..6        sort by column number
  Up/Down     move selection
  PgUp/PgDn   move one page
  g / G       first / last row
  y           copy row to clipboard (csv)
  ?           this help
  Esc         close popup";

#[derive(Debug)]
pub enum FvError {
    IoError(Error),
    JsonError(serde_json::Error),
    HttpError(reqwest::Error),
    HttpStatus(u16),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
}

impl fmt::Display for FvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FvError::IoError(e) => write!(f, "io error: {e}"),
            FvError::JsonError(e) => write!(f, "invalid json: {e}"),
            FvError::HttpError(e) => write!(f, "request failed: {e}"),
            FvError::HttpStatus(code) => write!(f, "HTTP error! Status: {code}"),
            FvError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            FvError::FileNotFound => write!(f, "file not found"),
            FvError::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl std::error::Error for FvError {}

impl From<Error> for FvError {
    fn from(err: Error) -> Self {
        FvError::IoError(err)
    }
}

impl From<serde_json::Error> for FvError {
    fn from(err: serde_json::Error) -> Self {
        FvError::JsonError(err)
    }
}

impl From<reqwest::Error> for FvError {
    fn from(err: reqwest::Error) -> Self {
        FvError::HttpError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct ViewerConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    #[setters(strip_option)]
    pub initial_search: Option<String>,
    #[setters(strip_option)]
    pub initial_sort: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            initial_search: None,
            initial_sort: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveLeft,
    MoveRight,
    SortSelected,
    SortColumn(usize),
    Search,
    CopyRow,
    Help,
    Enter,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}
