use crate::data::schema::Metric;
use crate::state::theme::Theme;

/// Tabs of the main window, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Time,
    Memory,
    AvgByPass,
    AvgBySize,
    Stats,
    Correctness,
    RawData,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Time,
        Tab::Memory,
        Tab::AvgByPass,
        Tab::AvgBySize,
        Tab::Stats,
        Tab::Correctness,
        Tab::RawData,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Time => "Time (s)",
            Tab::Memory => "Memory (kB)",
            Tab::AvgByPass => "Avg by pass",
            Tab::AvgBySize => "Avg by n",
            Tab::Stats => "Stats",
            Tab::Correctness => "Correctness",
            Tab::RawData => "Raw data",
        }
    }
}

/// Direction for table column sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// UI selections. The dataset itself lives next to this and is never
/// modified by the UI.
#[derive(Debug, Clone)]
pub struct AppState {
    pub theme: Theme,
    pub active_tab: Tab,
    /// Pass shown on the Time tab.
    pub time_pass: Option<u32>,
    /// Pass shown on the Memory tab.
    pub memory_pass: Option<u32>,
    /// Metric used by the Stats tab and by aggregate exports.
    pub table_metric: Metric,
    /// (column_index, direction) of the visible table; None = source order.
    pub table_sort: Option<(usize, SortDirection)>,
    pub show_warnings: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            theme: Theme::default(),
            active_tab: Tab::Time,
            time_pass: None,
            memory_pass: None,
            table_metric: Metric::Time,
            table_sort: None,
            show_warnings: true,
        }
    }

    /// Point both pass selectors at the first available pass, keeping the
    /// current choice when it still exists.
    pub fn sync_passes(&mut self, passes: &[u32]) {
        for selected in [&mut self.time_pass, &mut self.memory_pass] {
            let still_valid = selected.is_some_and(|p| passes.contains(&p));
            if !still_valid {
                *selected = passes.first().copied();
            }
        }
    }

    pub fn selected_pass(&self, metric: Metric) -> Option<u32> {
        match metric {
            Metric::Time => self.time_pass,
            Metric::Memory => self.memory_pass,
        }
    }

    pub fn selected_pass_mut(&mut self, metric: Metric) -> &mut Option<u32> {
        match metric {
            Metric::Time => &mut self.time_pass,
            Metric::Memory => &mut self.memory_pass,
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.table_sort = None;
        }
    }

    /// Clicking a header cycles ascending, descending, unsorted.
    pub fn cycle_sort(&mut self, col: usize) {
        self.table_sort = match self.table_sort {
            Some((c, SortDirection::Ascending)) if c == col => Some((col, SortDirection::Descending)),
            Some((c, SortDirection::Descending)) if c == col => None,
            _ => Some((col, SortDirection::Ascending)),
        };
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
