use crate::backend::model::{Page, Voter};

pub const UNASSIGNED: &str = "Sin asignar";

#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    pub voter: Voter,
    /// Candidate names from the voter's assignment; `None` when it could not
    /// be resolved.
    pub candidates: Option<Vec<String>>,
}

impl ListingRow {
    pub fn unenriched(voter: Voter) -> Self {
        Self { voter, candidates: None }
    }

    pub fn assigned_label(&self) -> String {
        match &self.candidates {
            Some(names) if !names.is_empty() => names.join(", "),
            _ => UNASSIGNED.to_string(),
        }
    }
}

/// Case-insensitive substring match over the columns the table shows.
pub fn matches_search(voter: &Voter, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let optional = |v: &Option<String>| v.as_deref().unwrap_or("").to_lowercase();
    [
        voter.first_name.to_lowercase(),
        voter.last_name.to_lowercase(),
        voter.full_name().to_lowercase(),
        voter.identification.to_lowercase(),
        optional(&voter.email),
        optional(&voter.phone),
        optional(&voter.voting_location),
    ]
    .iter()
    .any(|column| column.contains(&query))
}

/// One server page of voters plus local search and delete confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub page: u32,
    pub page_size: u32,
    pub pages: u32,
    pub total: u64,
    pub rows: Vec<ListingRow>,
    pub search: String,
    pub loading: bool,
    pub error: Option<String>,
    pending_delete: Option<i64>,
}

impl Listing {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            pages: 0,
            total: 0,
            rows: Vec::new(),
            search: String::new(),
            loading: false,
            error: None,
            pending_delete: None,
        }
    }

    /// Marks `page` as the page being fetched and returns it.
    pub fn request(&mut self, page: u32) -> u32 {
        self.page = page.max(1);
        self.loading = true;
        self.error = None;
        self.page
    }

    /// Installs a fetched page. Answers for a page other than the one last
    /// requested are dropped.
    pub fn loaded(&mut self, page: Page<ListingRow>) -> bool {
        if self.loading && page.page != self.page {
            return false;
        }
        self.page = page.page.max(1);
        self.pages = page.pages;
        self.total = page.total;
        self.rows = page.data;
        self.loading = false;
        self.error = None;
        true
    }

    /// Records a failed fetch of `page`; failures of a superseded request
    /// are dropped like stale pages.
    pub fn failed(&mut self, page: u32, message: impl Into<String>) -> bool {
        if self.loading && page != self.page {
            return false;
        }
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    /// Rows of the loaded page matching the search box. Never looks beyond
    /// the current page.
    pub fn visible(&self) -> Vec<&ListingRow> {
        self.rows
            .iter()
            .filter(|row| matches_search(&row.voter, &self.search))
            .collect()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous().then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    pub fn ask_delete(&mut self, voter_id: i64) {
        self.pending_delete = Some(voter_id);
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Confirms the pending delete, handing back the voter to remove.
    pub fn confirm_delete(&mut self) -> Option<i64> {
        self.pending_delete.take()
    }

    pub fn row(&self, voter_id: i64) -> Option<&ListingRow> {
        self.rows.iter().find(|row| row.voter.id == voter_id)
    }
}
