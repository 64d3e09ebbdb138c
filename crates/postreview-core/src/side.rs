/// One of the two output trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// State at the from-commit
    Old,
    /// State at the to-commit
    New,
}

impl Side {
    /// Directory name under the export root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Side::Old => "old",
            Side::New => "new",
        }
    }

    /// Tree prefix handed to `git archive`
    pub fn prefix(&self) -> &'static str {
        match self {
            Side::Old => "old/",
            Side::New => "new/",
        }
    }

    /// Transient zip written into the export root
    pub fn archive_name(&self) -> &'static str {
        match self {
            Side::Old => "old.zip",
            Side::New => "new.zip",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Old => Side::New,
            Side::New => Side::Old,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}
