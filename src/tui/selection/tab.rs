use std::fmt;

/// The focused view of the selection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ActiveTab {
    #[default]
    Selector,
    Readme,
}

impl ActiveTab {
    /// All tabs in strip order.
    pub const ALL: [ActiveTab; 2] = [ActiveTab::Selector, ActiveTab::Readme];

    pub fn label(self) -> &'static str {
        match self {
            ActiveTab::Selector => "Repositories",
            ActiveTab::Readme => "About",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|t| t.label().to_string()).collect()
    }
}

impl fmt::Display for ActiveTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTab(pub usize);

impl fmt::Display for InvalidTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no tab at index {}", self.0)
    }
}

impl std::error::Error for InvalidTab {}

impl TryFrom<usize> for ActiveTab {
    type Error = InvalidTab;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL.get(index).copied().ok_or(InvalidTab(index))
    }
}
