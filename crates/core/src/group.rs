use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const CATALOG_GROUP: &str = "base";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoardKind {
    Avatar,
    Mainboard,
    Sideboard,
    Maybeboard,
}

impl BoardKind {
    pub const ALL: [BoardKind; 4] = [
        BoardKind::Avatar,
        BoardKind::Mainboard,
        BoardKind::Sideboard,
        BoardKind::Maybeboard,
    ];

    /// Boards with a packed rectangular region.
    pub const BOUNDED: [BoardKind; 3] = [
        BoardKind::Mainboard,
        BoardKind::Sideboard,
        BoardKind::Maybeboard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Mainboard => "mainboard",
            Self::Sideboard => "sideboard",
            Self::Maybeboard => "maybeboard",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value {
            "avatar" => Some(Self::Avatar),
            "mainboard" => Some(Self::Mainboard),
            "sideboard" => Some(Self::Sideboard),
            "maybeboard" => Some(Self::Maybeboard),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupParseError {
    #[error("empty group id")]
    Empty,
    #[error("unknown board in group id {0:?}")]
    UnknownBoard(String),
}

/// Placement namespace: the catalog view or one board of one deck.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GroupId {
    Catalog,
    Board { deck: String, board: BoardKind },
}

impl GroupId {
    pub fn board(deck: impl Into<String>, board: BoardKind) -> Self {
        Self::Board {
            deck: deck.into(),
            board,
        }
    }

    pub fn is_catalog(&self) -> bool {
        matches!(self, Self::Catalog)
    }

    pub fn deck(&self) -> Option<&str> {
        match self {
            Self::Catalog => None,
            Self::Board { deck, .. } => Some(deck),
        }
    }

    pub fn board_kind(&self) -> Option<BoardKind> {
        match self {
            Self::Catalog => None,
            Self::Board { board, .. } => Some(*board),
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => f.write_str(CATALOG_GROUP),
            Self::Board { deck, board } => write!(f, "{}_{}", deck, board.name()),
        }
    }
}

impl FromStr for GroupId {
    type Err = GroupParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(GroupParseError::Empty);
        }
        if value == CATALOG_GROUP {
            return Ok(Self::Catalog);
        }
        // Deck ids may contain underscores; the board is always the last segment.
        let (deck, board) = value
            .rsplit_once('_')
            .ok_or_else(|| GroupParseError::UnknownBoard(value.to_string()))?;
        let board = BoardKind::from_name(board)
            .ok_or_else(|| GroupParseError::UnknownBoard(value.to_string()))?;
        if deck.is_empty() {
            return Err(GroupParseError::Empty);
        }
        Ok(Self::board(deck, board))
    }
}

impl TryFrom<String> for GroupId {
    type Error = GroupParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GroupId> for String {
    fn from(value: GroupId) -> Self {
        value.to_string()
    }
}
