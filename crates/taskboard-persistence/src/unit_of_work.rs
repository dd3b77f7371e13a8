//! Load, mutate, diff, commit.
//!
//! A unit of work keeps the documents exactly as they were read next to a
//! working copy that commands mutate. Diffing the two yields a [`WriteBatch`]
//! in which every read document is pinned to the version it had when read,
//! so a store can refuse the whole batch if anything moved underneath it.

use std::fmt;
use taskboard_core::{ObjectId, TaskboardResult};
use taskboard_domain::{Board, Card, Column, Command, CommandContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Board,
    Column,
    Card,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board => f.write_str("board"),
            Self::Column => f.write_str("column"),
            Self::Card => f.write_str("card"),
        }
    }
}

/// A read document that was not changed but must still be unchanged at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGuard {
    pub kind: DocumentKind,
    pub id: ObjectId,
    pub version: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSet {
    pub boards: Vec<Board>,
    pub columns: Vec<Column>,
    pub cards: Vec<Card>,
}

impl DocumentSet {
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty() && self.columns.is_empty() && self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.boards.len() + self.columns.len() + self.cards.len()
    }

    pub fn board(&self, id: ObjectId) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn column(&self, id: ObjectId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn card(&self, id: ObjectId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn push_board(&mut self, board: Option<Board>) {
        if let Some(board) = board {
            if self.board(board.id).is_none() {
                self.boards.push(board);
            }
        }
    }

    pub fn push_column(&mut self, column: Option<Column>) {
        if let Some(column) = column {
            if self.column(column.id).is_none() {
                self.columns.push(column);
            }
        }
    }

    pub fn extend_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        for card in cards {
            if self.card(card.id).is_none() {
                self.cards.push(card);
            }
        }
    }
}

/// Everything a store must apply atomically, or not at all.
///
/// Inserted documents carry version 1. Updated documents carry their new
/// version and expect the stored one to be exactly one lower.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub guards: Vec<VersionGuard>,
    pub inserts: DocumentSet,
    pub updates: DocumentSet,
}

impl WriteBatch {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }

    pub fn write_count(&self) -> usize {
        self.inserts.len() + self.updates.len()
    }
}

pub struct UnitOfWork {
    original: DocumentSet,
    working: DocumentSet,
}

impl UnitOfWork {
    pub fn new(loaded: DocumentSet) -> Self {
        Self {
            working: loaded.clone(),
            original: loaded,
        }
    }

    pub fn context(&mut self) -> CommandContext<'_> {
        CommandContext {
            boards: &mut self.working.boards,
            columns: &mut self.working.columns,
            cards: &mut self.working.cards,
        }
    }

    pub fn execute(&mut self, command: &dyn Command) -> TaskboardResult<()> {
        tracing::debug!(command = %command.description(), "executing command");
        command.execute(&mut self.context())
    }

    /// Diff the working copy against what was read.
    ///
    /// Returns the batch to commit and the documents as they will look once
    /// it is committed, versions included.
    pub fn into_batch(self) -> (WriteBatch, DocumentSet) {
        let mut batch = WriteBatch::default();
        let mut committed = DocumentSet::default();

        diff(
            &self.original.boards,
            self.working.boards,
            &mut batch.guards,
            (&mut batch.inserts.boards, &mut batch.updates.boards),
            &mut committed.boards,
        );
        diff(
            &self.original.columns,
            self.working.columns,
            &mut batch.guards,
            (&mut batch.inserts.columns, &mut batch.updates.columns),
            &mut committed.columns,
        );
        diff(
            &self.original.cards,
            self.working.cards,
            &mut batch.guards,
            (&mut batch.inserts.cards, &mut batch.updates.cards),
            &mut committed.cards,
        );

        (batch, committed)
    }
}

/// Common shape of stored documents.
pub trait Versioned: Clone + PartialEq {
    const KIND: DocumentKind;

    fn id(&self) -> ObjectId;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}

macro_rules! impl_versioned {
    ($ty:ty, $kind:expr) => {
        impl Versioned for $ty {
            const KIND: DocumentKind = $kind;

            fn id(&self) -> ObjectId {
                self.id
            }

            fn version(&self) -> u64 {
                self.version
            }

            fn set_version(&mut self, version: u64) {
                self.version = version;
            }
        }
    };
}

impl_versioned!(Board, DocumentKind::Board);
impl_versioned!(Column, DocumentKind::Column);
impl_versioned!(Card, DocumentKind::Card);

fn diff<T: Versioned>(
    original: &[T],
    working: Vec<T>,
    guards: &mut Vec<VersionGuard>,
    (inserts, updates): (&mut Vec<T>, &mut Vec<T>),
    committed: &mut Vec<T>,
) {
    for mut doc in working {
        match original.iter().find(|o| o.id() == doc.id()) {
            None => {
                doc.set_version(1);
                inserts.push(doc.clone());
            }
            Some(before) if *before == doc => guards.push(VersionGuard {
                kind: T::KIND,
                id: doc.id(),
                version: before.version(),
            }),
            Some(before) => {
                doc.set_version(before.version() + 1);
                updates.push(doc.clone());
            }
        }
        committed.push(doc);
    }
}
