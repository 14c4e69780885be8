use crate::backend::api::reports::ReportFilters;
use crate::backend::model::{Aggregations, Candidate, Report, Voter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Gender,
    Leader,
    Corporation,
    Candidate,
    Department,
    Municipality,
    VotingLocation,
}

/// An aggregation counter the user can click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketKey {
    Gender(String),
    Leader(i64),
    Candidate(i64),
    Location { department_id: i64, municipality_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    FirstName,
    LastName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
struct LastToggle {
    bucket: BucketKey,
    before: ReportFilters,
    after: ReportFilters,
}

pub fn gender_label(gender: Option<&str>) -> &'static str {
    match gender {
        Some("M") => "Masculino",
        Some("F") => "Femenino",
        _ => "Otro",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub filters: ReportFilters,
    pub rows: Vec<Voter>,
    pub aggregations: Option<Aggregations>,
    pub loading: bool,
    pub error: Option<String>,
    pub sort: (SortColumn, SortDirection),
    last_toggle: Option<LastToggle>,
    /// `(department, municipality, name)` seen in location counters. Kept
    /// while a municipality filter narrows the report to a single bucket.
    locations: Vec<(i64, i64, String)>,
}

impl ReportView {
    pub fn new(limit: u32) -> Self {
        Self {
            filters: ReportFilters { limit, ..Default::default() },
            rows: Vec::new(),
            aggregations: None,
            loading: false,
            error: None,
            sort: (SortColumn::Id, SortDirection::Asc),
            last_toggle: None,
            locations: Vec::new(),
        }
    }

    fn slot(&mut self, key: FilterKey) -> &mut String {
        let f = &mut self.filters;
        match key {
            FilterKey::Gender => &mut f.gender,
            FilterKey::Leader => &mut f.leader_id,
            FilterKey::Corporation => &mut f.corporation_id,
            FilterKey::Candidate => &mut f.candidate_id,
            FilterKey::Department => &mut f.department_id,
            FilterKey::Municipality => &mut f.municipality_id,
            FilterKey::VotingLocation => &mut f.voting_location,
        }
    }

    /// Applies a change from the filter panel and returns the filters to
    /// fetch with. `candidates` is the full candidate list, used to drop a
    /// candidate filter that falls outside a newly chosen corporation.
    pub fn set_filter(&mut self, key: FilterKey, value: impl Into<String>, candidates: &[Candidate]) -> ReportFilters {
        let value = value.into();
        let changed = *self.slot(key) != value;
        *self.slot(key) = value;

        if changed && key == FilterKey::Department {
            self.filters.municipality_id.clear();
        }
        if key == FilterKey::Corporation && !self.filters.candidate_id.is_empty() {
            let keep = self
                .candidate_options(candidates)
                .iter()
                .any(|c| c.id.to_string() == self.filters.candidate_id);
            if !keep {
                self.filters.candidate_id.clear();
            }
        }
        self.filters.page = 1;
        self.last_toggle = None;
        self.filters.clone()
    }

    /// Toggles the filter behind a counter. Clicking the same counter again
    /// restores the filters from before the first click.
    pub fn toggle_bucket(&mut self, bucket: BucketKey) -> ReportFilters {
        if let Some(last) = self.last_toggle.take() {
            if last.bucket == bucket && last.after == self.filters {
                self.filters = last.before;
                return self.filters.clone();
            }
        }

        let before = self.filters.clone();
        let toggle = |slot: &mut String, value: String| {
            if *slot == value {
                slot.clear();
            } else {
                *slot = value;
            }
        };
        match &bucket {
            BucketKey::Gender(gender) => toggle(&mut self.filters.gender, gender.clone()),
            BucketKey::Leader(id) => toggle(&mut self.filters.leader_id, id.to_string()),
            BucketKey::Candidate(id) => toggle(&mut self.filters.candidate_id, id.to_string()),
            BucketKey::Location { department_id, municipality_id } => {
                let department = department_id.to_string();
                let municipality = municipality_id.to_string();
                if self.filters.department_id == department && self.filters.municipality_id == municipality {
                    self.filters.department_id.clear();
                    self.filters.municipality_id.clear();
                } else {
                    self.filters.department_id = department;
                    self.filters.municipality_id = municipality;
                }
            }
        }
        self.filters.page = 1;
        self.last_toggle = Some(LastToggle { bucket, before, after: self.filters.clone() });
        self.filters.clone()
    }

    pub fn clear_filters(&mut self) -> ReportFilters {
        self.filters = ReportFilters { limit: self.filters.limit, ..Default::default() };
        self.last_toggle = None;
        self.filters.clone()
    }

    pub fn request(&mut self) -> ReportFilters {
        self.loading = true;
        self.error = None;
        self.filters.clone()
    }

    /// Installs a report fetched for `filters`; dropped when the filters have
    /// changed since.
    pub fn loaded(&mut self, filters: &ReportFilters, report: Report) -> bool {
        if *filters != self.filters {
            return false;
        }
        self.remember_locations(report.aggregations.as_ref());
        self.rows = report.data;
        self.aggregations = report.aggregations;
        self.loading = false;
        self.error = None;
        true
    }

    fn remember_locations(&mut self, aggregations: Option<&Aggregations>) {
        let Some(aggregations) = aggregations else { return };
        if self.filters.municipality_id.is_empty() {
            self.locations.clear();
        }
        for bucket in &aggregations.by_location {
            let seen = self
                .locations
                .iter()
                .any(|(d, m, _)| *d == bucket.department_id && *m == bucket.municipality_id);
            if !seen {
                self.locations.push((bucket.department_id, bucket.municipality_id, bucket.municipality_name.clone()));
            }
        }
    }

    pub fn failed(&mut self, filters: &ReportFilters, message: impl Into<String>) -> bool {
        if *filters != self.filters {
            return false;
        }
        self.rows.clear();
        self.aggregations = None;
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    /// Candidates of the selected corporation, or all of them.
    pub fn candidate_options<'a>(&self, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
        let corporation: Option<i64> = self.filters.corporation_id.parse().ok();
        candidates
            .iter()
            .filter(|c| match corporation {
                Some(id) => c.corporation.as_ref().map(|corp| corp.id) == Some(id),
                None => true,
            })
            .collect()
    }

    /// Municipalities of the selected department, taken from the location
    /// counters of the reports loaded so far. An active municipality filter
    /// does not hide its siblings.
    pub fn municipality_options(&self) -> Vec<(i64, String)> {
        let Ok(department) = self.filters.department_id.parse::<i64>() else {
            return Vec::new();
        };
        self.locations
            .iter()
            .filter(|(d, _, _)| *d == department)
            .map(|(_, m, name)| (*m, name.clone()))
            .collect()
    }

    pub fn is_active(&self, bucket: &BucketKey) -> bool {
        match bucket {
            BucketKey::Gender(g) => self.filters.gender == *g,
            BucketKey::Leader(id) => self.filters.leader_id == id.to_string(),
            BucketKey::Candidate(id) => self.filters.candidate_id == id.to_string(),
            BucketKey::Location { department_id, municipality_id } => {
                self.filters.department_id == department_id.to_string()
                    && self.filters.municipality_id == municipality_id.to_string()
            }
        }
    }

    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort = match self.sort {
            (current, SortDirection::Asc) if current == column => (column, SortDirection::Desc),
            _ => (column, SortDirection::Asc),
        };
    }

    pub fn sorted_rows(&self) -> Vec<&Voter> {
        let (column, direction) = self.sort;
        let mut rows: Vec<&Voter> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            let ordering = match column {
                SortColumn::Id => a.id.cmp(&b.id),
                SortColumn::FirstName => a.first_name.cmp(&b.first_name),
                SortColumn::LastName => a.last_name.cmp(&b.last_name),
            };
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        rows
    }
}

impl Default for ReportView {
    fn default() -> Self {
        Self::new(crate::backend::api::reports::DEFAULT_REPORT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::model::{Corporation, LocationBucket};

    fn candidate(id: i64, corporation: i64) -> Candidate {
        Candidate {
            id,
            name: format!("C{}", id),
            party: None,
            corporation: Some(Corporation { id: corporation, name: format!("Corp{}", corporation) }),
        }
    }

    fn voter(id: i64, first: &str, last: &str) -> Voter {
        Voter { id, first_name: first.into(), last_name: last.into(), ..Default::default() }
    }

    #[test]
    fn test_double_toggle_restores_filters() {
        let mut view = ReportView::default();
        let prior = view.filters.clone();
        view.toggle_bucket(BucketKey::Gender("F".into()));
        assert_eq!(view.filters.gender, "F");
        view.toggle_bucket(BucketKey::Gender("F".into()));
        assert_eq!(view.filters, prior);

        view.set_filter(FilterKey::Department, "5", &[]);
        let prior = view.filters.clone();
        let location = BucketKey::Location { department_id: 5, municipality_id: 12 };
        view.toggle_bucket(location.clone());
        assert_eq!(view.filters.municipality_id, "12");
        view.toggle_bucket(location);
        assert_eq!(view.filters, prior);
    }

    #[test]
    fn test_toggle_active_value_clears_it() {
        let mut view = ReportView::default();
        view.set_filter(FilterKey::Leader, "4", &[]);
        assert!(view.is_active(&BucketKey::Leader(4)));
        let filters = view.toggle_bucket(BucketKey::Leader(4));
        assert!(filters.leader_id.is_empty());
    }

    #[test]
    fn test_department_change_clears_municipality() {
        let mut view = ReportView::default();
        view.toggle_bucket(BucketKey::Location { department_id: 5, municipality_id: 12 });
        let filters = view.set_filter(FilterKey::Department, "8", &[]);
        assert_eq!(filters.department_id, "8");
        assert!(filters.municipality_id.is_empty());
    }

    #[test]
    fn test_corporation_filters_candidates_locally() {
        let candidates = vec![candidate(1, 10), candidate(2, 20), candidate(3, 10)];
        let mut view = ReportView::default();
        view.set_filter(FilterKey::Candidate, "2", &candidates);

        let filters = view.set_filter(FilterKey::Corporation, "10", &candidates);
        assert!(filters.candidate_id.is_empty());
        let ids: Vec<i64> = view.candidate_options(&candidates).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);

        view.set_filter(FilterKey::Corporation, "", &candidates);
        assert_eq!(view.candidate_options(&candidates).len(), 3);
    }

    fn location(department_id: i64, municipality_id: i64, name: &str) -> LocationBucket {
        LocationBucket {
            department_id,
            department_name: format!("D{}", department_id),
            municipality_id,
            municipality_name: name.into(),
            count: 1,
        }
    }

    fn report_with(locations: Vec<LocationBucket>) -> Report {
        Report {
            data: Vec::new(),
            aggregations: Some(Aggregations { by_location: locations, ..Default::default() }),
        }
    }

    #[test]
    fn test_municipality_options_from_location_buckets() {
        let mut view = ReportView::default();
        assert!(view.municipality_options().is_empty());
        let filters = view.request();
        view.loaded(&filters, report_with(vec![location(5, 12, "Bello"), location(8, 30, "Tunja")]));

        view.set_filter(FilterKey::Department, "5", &[]);
        assert_eq!(view.municipality_options(), vec![(12, "Bello".to_string())]);
    }

    #[test]
    fn test_municipality_filter_keeps_sibling_options() {
        let mut view = ReportView::default();
        view.set_filter(FilterKey::Department, "5", &[]);
        let filters = view.request();
        view.loaded(&filters, report_with(vec![location(5, 12, "Bello"), location(5, 14, "Envigado")]));

        view.set_filter(FilterKey::Municipality, "12", &[]);
        let filters = view.request();
        view.loaded(&filters, report_with(vec![location(5, 12, "Bello")]));

        assert_eq!(
            view.municipality_options(),
            vec![(12, "Bello".to_string()), (14, "Envigado".to_string())]
        );
    }

    #[test]
    fn test_stale_report_is_dropped() {
        let mut view = ReportView::default();
        let old = view.request();
        view.set_filter(FilterKey::Gender, "M", &[]);
        let report = Report { data: vec![voter(1, "Ana", "Rojas")], aggregations: None };
        assert!(!view.loaded(&old, report.clone()));
        assert!(view.rows.is_empty());
        let current = view.request();
        assert!(view.loaded(&current, report));
        assert_eq!(view.rows.len(), 1);
    }

    #[test]
    fn test_sorting_flips_on_same_column() {
        let mut view = ReportView::default();
        view.rows = vec![voter(2, "Beto", "Zea"), voter(1, "Ana", "Mora"), voter(3, "Carla", "Abad")];
        let ids = |v: &ReportView| v.sorted_rows().iter().map(|r| r.id).collect::<Vec<_>>();

        assert_eq!(ids(&view), vec![1, 2, 3]);
        view.sort_by(SortColumn::LastName);
        assert_eq!(ids(&view), vec![3, 1, 2]);
        view.sort_by(SortColumn::LastName);
        assert_eq!(ids(&view), vec![2, 1, 3]);
    }

    #[test]
    fn test_clear_keeps_limit() {
        let mut view = ReportView::new(25);
        view.set_filter(FilterKey::VotingLocation, "Colegio", &[]);
        let filters = view.clear_filters();
        assert_eq!(filters, ReportFilters { limit: 25, ..Default::default() });
    }
}
