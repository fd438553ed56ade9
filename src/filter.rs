//! Search, per-column filters and sorting over an in-memory record slice.
//!
//! The view is recomputed from scratch on every read: records that pass the
//! global search and every non-blank column filter are kept in input order,
//! then stable-sorted when a sort is active. Nothing here fails; missing or
//! null values simply never match and always sort last.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::collate::locale_cmp;
use crate::record::{FieldAccess, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    Descending,
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub field: String,
    pub direction: SortDirection,
}

impl SortConfig {
    /// An empty field and `SortDirection::None` both mean "unsorted".
    pub fn is_active(&self) -> bool {
        !self.field.is_empty() && self.direction != SortDirection::None
    }

    /// Direction applied to `field`, `None` unless it is the sorted column.
    pub fn direction_of(&self, field: &str) -> SortDirection {
        if self.is_active() && self.field == field {
            self.direction
        } else {
            SortDirection::None
        }
    }
}

/// Search term, column filters and sort of one table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub global_search: String,
    pub column_filters: BTreeMap<String, String>,
    pub sort_config: SortConfig,
}

impl FilterState {
    /// Stored verbatim; trimming happens when the view is computed.
    pub fn set_global_search(&mut self, term: impl Into<String>) {
        self.global_search = term.into();
    }

    /// Overwrites one column's term. A blank term keeps the key but imposes
    /// no constraint.
    pub fn update_column_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.column_filters.insert(field.into(), value.into());
    }

    /// Drops the key for `field` altogether, returning its old term.
    pub fn remove_column_filter(&mut self, field: &str) -> Option<String> {
        self.column_filters.remove(field)
    }

    /// Cycles ascending -> descending -> unsorted for `field`. Picking another
    /// field always starts over at ascending.
    pub fn toggle_sort(&mut self, field: &str) {
        let current = &self.sort_config;
        self.sort_config = if current.field != field {
            SortConfig {
                field: field.to_string(),
                direction: SortDirection::Ascending,
            }
        } else {
            match current.direction {
                SortDirection::Ascending => SortConfig {
                    field: field.to_string(),
                    direction: SortDirection::Descending,
                },
                SortDirection::Descending => SortConfig::default(),
                SortDirection::None => SortConfig {
                    field: field.to_string(),
                    direction: SortDirection::Ascending,
                },
            }
        };
    }

    pub fn clear_all_filters(&mut self) {
        *self = FilterState::default();
    }

    /// Sort alone is not a filter.
    pub fn has_active_filters(&self) -> bool {
        !self.global_search.trim().is_empty()
            || self.column_filters.values().any(|v| !v.trim().is_empty())
    }

    pub fn column_filter(&self, field: &str) -> Option<&str> {
        self.column_filters.get(field).map(String::as_str)
    }
}

/// Read-only result of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView<'a, T> {
    pub filtered_data: Vec<&'a T>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub global_search: String,
    pub column_filters: BTreeMap<String, String>,
    pub sort_config: SortConfig,
    pub has_active_filters: bool,
}

fn field_contains<T: FieldAccess>(record: &T, field: &str, needle: &str) -> bool {
    record
        .field(field)
        .and_then(Value::search_text)
        .is_some_and(|text| text.to_lowercase().contains(needle))
}

/// NaN goes after every other float.
fn cmp_float(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an integer with a float, without rounding the integer.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63 as f64; anything at or past it is out of i64 range
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| cmp_float(whole, f))
}

fn cmp_numeric(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => Some(cmp_float(*x, *y)),
        (Value::Int(x), Value::Number(y)) => Some(cmp_int_float(*x, *y)),
        (Value::Number(x), Value::Int(y)) => Some(cmp_int_float(*y, *x).reverse()),
        _ => None,
    }
}

/// Orders two field values. Nulls (and absent fields) go last whatever the
/// direction; two numbers compare numerically, anything else by text.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            // Numeric-looking text stays text: "10" < "9"
            let ord = cmp_numeric(a, b)
                .unwrap_or_else(|| locale_cmp(&a.to_string(), &b.to_string()));
            match direction {
                SortDirection::Descending => ord.reverse(),
                _ => ord,
            }
        }
    }
}

/// Evaluates `state` against `records`. Pure: same inputs, same view.
pub fn compute_view<'a, T: FieldAccess>(
    records: &'a [T],
    searchable_fields: &[String],
    state: &FilterState,
) -> DerivedView<'a, T> {
    let needle = state.global_search.trim().to_lowercase();
    let column_needles: Vec<(&str, String)> = state
        .column_filters
        .iter()
        .filter_map(|(field, value)| {
            let term = value.trim();
            (!term.is_empty()).then(|| (field.as_str(), term.to_lowercase()))
        })
        .collect();

    let mut filtered_data: Vec<&T> = records
        .iter()
        .filter(|record| {
            needle.is_empty()
                || searchable_fields
                    .iter()
                    .any(|field| field_contains(*record, field, &needle))
        })
        .filter(|record| {
            column_needles
                .iter()
                .all(|(field, term)| field_contains(*record, field, term))
        })
        .collect();
    let filtered_count = filtered_data.len();

    let sort = &state.sort_config;
    if sort.is_active() {
        // sort_by is stable, equal keys keep their input order
        filtered_data.sort_by(|a, b| {
            compare_values(a.field(&sort.field), b.field(&sort.field), sort.direction)
        });
    }

    debug!(
        "View computed: {}/{} records, sort {:?}",
        filtered_count,
        records.len(),
        sort
    );

    DerivedView {
        filtered_data,
        total_count: records.len(),
        filtered_count,
        global_search: state.global_search.clone(),
        column_filters: state.column_filters.clone(),
        sort_config: sort.clone(),
        has_active_filters: state.has_active_filters(),
    }
}

/// Filter and sort state of a single table, plus the fields the global
/// search looks at. Each table owns its own instance.
#[derive(Debug, Clone, Default)]
pub struct TableFilters {
    searchable_fields: Vec<String>,
    state: FilterState,
}

impl TableFilters {
    pub fn new<I, S>(searchable_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            searchable_fields: searchable_fields.into_iter().map(Into::into).collect(),
            state: FilterState::default(),
        }
    }

    pub fn searchable_fields(&self) -> &[String] {
        &self.searchable_fields
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn global_search(&self) -> &str {
        &self.state.global_search
    }

    pub fn sort_config(&self) -> &SortConfig {
        &self.state.sort_config
    }

    pub fn has_active_filters(&self) -> bool {
        self.state.has_active_filters()
    }

    pub fn set_global_search(&mut self, term: impl Into<String>) {
        self.state.set_global_search(term);
        trace!("Global search set to {:?}", self.state.global_search);
    }

    pub fn update_column_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        trace!("Column filter {:?} set to {:?}", field, value);
        self.state.update_column_filter(field, value);
    }

    pub fn remove_column_filter(&mut self, field: &str) {
        let old = self.state.remove_column_filter(field);
        trace!("Column filter {:?} removed (was {:?})", field, old);
    }

    pub fn toggle_sort(&mut self, field: &str) {
        self.state.toggle_sort(field);
        trace!("Sort on {:?} is now {:?}", field, self.state.sort_config);
    }

    pub fn clear_all_filters(&mut self) {
        self.state.clear_all_filters();
        trace!("Cleared search, column filters and sort");
    }

    pub fn view<'a, T: FieldAccess>(&self, records: &'a [T]) -> DerivedView<'a, T> {
        compute_view(records, &self.searchable_fields, &self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn names(view: &DerivedView<'_, Record>, field: &str) -> Vec<String> {
        view.filtered_data.iter().map(|r| r.display(field)).collect()
    }

    fn xs(view: &DerivedView<'_, Record>) -> Vec<Value> {
        view.filtered_data
            .iter()
            .map(|r| r.get("x").cloned().unwrap_or_default())
            .collect()
    }

    #[test]
    fn toggle_sort_cycles_through_three_states() {
        let mut state = FilterState::default();
        state.toggle_sort("name");
        assert_eq!(state.sort_config.direction, SortDirection::Ascending);
        state.toggle_sort("name");
        assert_eq!(state.sort_config.direction, SortDirection::Descending);
        state.toggle_sort("name");
        assert_eq!(state.sort_config, SortConfig::default());
        state.toggle_sort("name");
        assert_eq!(state.sort_config.field, "name");
        assert_eq!(state.sort_config.direction, SortDirection::Ascending);
    }

    #[test]
    fn toggle_sort_on_other_field_restarts_ascending() {
        let mut state = FilterState::default();
        state.toggle_sort("name");
        state.toggle_sort("name");
        state.toggle_sort("city");
        assert_eq!(state.sort_config.field, "city");
        assert_eq!(state.sort_config.direction, SortDirection::Ascending);
    }

    #[test]
    fn toggle_sort_from_none_direction_on_same_field() {
        let mut state = FilterState::default();
        state.sort_config = SortConfig {
            field: "name".into(),
            direction: SortDirection::None,
        };
        assert!(!state.sort_config.is_active());
        state.toggle_sort("name");
        assert_eq!(state.sort_config.direction, SortDirection::Ascending);
    }

    #[test]
    fn nulls_sort_last_in_both_directions() {
        let records = vec![
            Record::new().with("x", 5),
            Record::new().with("x", Value::Null),
            Record::new().with("x", 1),
        ];
        let mut table = TableFilters::new(["x"]);
        table.toggle_sort("x");
        assert_eq!(
            xs(&table.view(&records)),
            vec![Value::Int(1), Value::Int(5), Value::Null]
        );
        table.toggle_sort("x");
        assert_eq!(
            xs(&table.view(&records)),
            vec![Value::Int(5), Value::Int(1), Value::Null]
        );
    }

    #[test]
    fn absent_fields_sort_after_present_ones() {
        let records = vec![
            Record::new().with("name", "b"),
            Record::new(),
            Record::new().with("name", "a"),
        ];
        let mut table = TableFilters::new(["name"]);
        table.toggle_sort("name");
        table.toggle_sort("name");
        assert_eq!(names(&table.view(&records), "name"), vec!["b", "a", ""]);
    }

    #[test]
    fn global_search_is_case_insensitive_substring() {
        let records = vec![
            Record::new().with("name", "João Silva"),
            Record::new().with("name", "Maria"),
        ];
        let mut table = TableFilters::new(["name"]);
        table.set_global_search("jo");
        let view = table.view(&records);
        assert_eq!(names(&view, "name"), vec!["João Silva"]);
        assert_eq!(view.filtered_count, 1);
        assert_eq!(view.total_count, 2);
        assert!(view.has_active_filters);
    }

    #[test]
    fn global_search_only_looks_at_searchable_fields() {
        let records = vec![
            Record::new().with("name", "Ana").with("city", "Joinville"),
            Record::new().with("name", "Joel").with("city", "Recife"),
        ];
        let mut table = TableFilters::new(["name"]);
        table.set_global_search("  JO ");
        assert_eq!(names(&table.view(&records), "name"), vec!["Joel"]);
    }

    #[test]
    fn global_search_is_stored_verbatim() {
        let mut table = TableFilters::new(["name"]);
        table.set_global_search("  abc ");
        assert_eq!(table.global_search(), "  abc ");
    }

    #[test]
    fn blank_search_keeps_everything() {
        let records = vec![Record::new().with("name", "a"), Record::new()];
        let mut table = TableFilters::new(["name"]);
        table.set_global_search("   ");
        let view = table.view(&records);
        assert_eq!(view.filtered_count, 2);
        assert!(!view.has_active_filters);
    }

    #[test]
    fn search_matches_numbers_and_booleans_by_text() {
        let records = vec![
            Record::new().with("weight", 1250).with("paid", true),
            Record::new().with("weight", 80.5).with("paid", false),
        ];
        let mut table = TableFilters::new(["weight", "paid"]);
        table.set_global_search("125");
        assert_eq!(table.view(&records).filtered_count, 1);
        table.set_global_search("TRUE");
        assert_eq!(table.view(&records).filtered_count, 1);
        table.set_global_search("80.5");
        assert_eq!(table.view(&records).filtered_count, 1);
    }

    #[test]
    fn null_values_never_match() {
        let records = vec![Record::new().with("name", Value::Null)];
        let mut table = TableFilters::new(["name"]);
        table.set_global_search("null");
        assert_eq!(table.view(&records).filtered_count, 0);
    }

    #[test]
    fn column_filters_and_combine() {
        let records = vec![
            Record::new().with("a", "x").with("b", "1"),
            Record::new().with("a", "x").with("b", "2"),
            Record::new().with("a", "y").with("b", "1"),
        ];
        let mut table = TableFilters::new(["a", "b"]);
        table.update_column_filter("a", "x");
        table.update_column_filter("b", "1");
        let view = table.view(&records);
        assert_eq!(view.filtered_count, 1);
        assert_eq!(view.filtered_data[0], &records[0]);
    }

    #[test]
    fn blank_column_filter_keeps_key_but_not_constraint() {
        let records = vec![Record::new().with("a", "x"), Record::new().with("a", "y")];
        let mut table = TableFilters::new(["a"]);
        table.update_column_filter("a", "x");
        assert_eq!(table.view(&records).filtered_count, 1);
        table.update_column_filter("a", "");
        let view = table.view(&records);
        assert_eq!(view.filtered_count, 2);
        assert_eq!(view.column_filters.get("a").map(String::as_str), Some(""));
        assert!(!view.has_active_filters);
    }

    #[test]
    fn removing_a_column_filter_drops_the_key() {
        let mut table = TableFilters::new(["a"]);
        table.update_column_filter("a", "x");
        table.update_column_filter("b", "");
        table.remove_column_filter("a");
        assert_eq!(table.state().column_filter("a"), None);
        assert_eq!(table.state().column_filter("b"), Some(""));
        table.remove_column_filter("missing");
        assert_eq!(table.state().column_filters.len(), 1);
    }

    #[test]
    fn filter_on_unknown_field_matches_nothing() {
        let records = vec![Record::new().with("a", "x")];
        let mut table = TableFilters::new(["a"]);
        table.update_column_filter("missing", "x");
        assert_eq!(table.view(&records).filtered_count, 0);
    }

    #[test]
    fn sort_on_unknown_field_keeps_input_order() {
        let records = vec![
            Record::new().with("a", "c"),
            Record::new().with("a", "a"),
            Record::new().with("a", "b"),
        ];
        let mut table = TableFilters::new(["a"]);
        table.toggle_sort("missing");
        assert_eq!(names(&table.view(&records), "a"), vec!["c", "a", "b"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let records = vec![
            Record::new().with("city", "Recife").with("id", 1),
            Record::new().with("city", "Natal").with("id", 2),
            Record::new().with("city", "recife").with("id", 3),
            Record::new().with("city", "Natal").with("id", 4),
        ];
        let mut table = TableFilters::new(["city"]);
        table.toggle_sort("city");
        assert_eq!(names(&table.view(&records), "id"), vec!["2", "4", "1", "3"]);
        table.toggle_sort("city");
        assert_eq!(names(&table.view(&records), "id"), vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn numeric_looking_text_sorts_as_text() {
        let records = vec![Record::new().with("n", "9"), Record::new().with("n", "10")];
        let mut table = TableFilters::new(["n"]);
        table.toggle_sort("n");
        assert_eq!(names(&table.view(&records), "n"), vec!["10", "9"]);
    }

    #[test]
    fn numbers_sort_numerically() {
        let records = vec![Record::new().with("n", 9), Record::new().with("n", 10)];
        let mut table = TableFilters::new(["n"]);
        table.toggle_sort("n");
        assert_eq!(names(&table.view(&records), "n"), vec!["9", "10"]);
    }

    #[test]
    fn integers_and_floats_compare_exactly() {
        let asc = SortDirection::Ascending;
        let cmp = |a: Value, b: Value| compare_values(Some(&a), Some(&b), asc);
        assert_eq!(cmp(Value::Int(2), Value::Number(2.5)), Ordering::Less);
        assert_eq!(cmp(Value::Number(2.5), Value::Int(3)), Ordering::Less);
        assert_eq!(cmp(Value::Int(-3), Value::Number(-2.5)), Ordering::Less);
        assert_eq!(cmp(Value::Int(4), Value::Number(4.0)), Ordering::Equal);
        // 2^53 + 1 is not representable as f64 but still orders above 2^53
        assert_eq!(
            cmp(Value::Int(9_007_199_254_740_993), Value::Number(9_007_199_254_740_992.0)),
            Ordering::Greater
        );
        assert_eq!(cmp(Value::Int(i64::MAX), Value::Number(1e19)), Ordering::Less);
        assert_eq!(cmp(Value::Number(f64::NAN), Value::Int(0)), Ordering::Greater);
    }

    #[test]
    fn large_ids_search_and_sort_exactly() {
        let records = vec![
            Record::new().with("id", 9_007_199_254_740_993i64),
            Record::new().with("id", 9_007_199_254_740_992i64),
        ];
        let mut table = TableFilters::new(["id"]);
        table.set_global_search("740993");
        assert_eq!(table.view(&records).filtered_count, 1);
        table.set_global_search("");
        table.toggle_sort("id");
        assert_eq!(
            names(&table.view(&records), "id"),
            vec!["9007199254740992", "9007199254740993"]
        );
    }

    #[test]
    fn mixed_number_and_text_compare_as_text() {
        let a = Value::Number(2.0);
        let b = Value::from("10");
        assert_eq!(
            compare_values(Some(&a), Some(&b), SortDirection::Ascending),
            Ordering::Greater
        );
    }

    #[test]
    fn sort_alone_is_not_an_active_filter() {
        let mut table = TableFilters::new(["a"]);
        table.toggle_sort("a");
        assert!(!table.has_active_filters());
    }

    #[test]
    fn clear_all_restores_input_order() {
        let records = vec![
            Record::new().with("a", "b"),
            Record::new().with("a", "a"),
            Record::new().with("a", "c"),
        ];
        let mut table = TableFilters::new(["a"]);
        table.set_global_search("a");
        table.update_column_filter("a", "a");
        table.toggle_sort("a");
        table.clear_all_filters();
        let view = table.view(&records);
        assert_eq!(names(&view, "a"), vec!["b", "a", "c"]);
        assert!(!view.has_active_filters);
        assert!(view.column_filters.is_empty());
        assert_eq!(view.global_search, "");
        assert_eq!(view.sort_config, SortConfig::default());
    }

    #[test]
    fn direction_of_reports_only_sorted_field() {
        let mut state = FilterState::default();
        state.toggle_sort("a");
        assert_eq!(state.sort_config.direction_of("a"), SortDirection::Ascending);
        assert_eq!(state.sort_config.direction_of("b"), SortDirection::None);
    }

    struct Driver {
        name: Value,
        plate: Value,
    }

    impl FieldAccess for Driver {
        fn field(&self, name: &str) -> Option<&Value> {
            match name {
                "name" => Some(&self.name),
                "plate" => Some(&self.plate),
                _ => None,
            }
        }
    }

    #[test]
    fn typed_rows_filter_through_field_access() {
        let drivers = vec![
            Driver {
                name: "Carlos".into(),
                plate: "ABC1D23".into(),
            },
            Driver {
                name: "Bruna".into(),
                plate: Value::Null,
            },
        ];
        let mut table = TableFilters::new(["name", "plate"]);
        table.set_global_search("abc");
        let view = table.view(&drivers);
        assert_eq!(view.filtered_count, 1);
        assert_eq!(view.filtered_data[0].name, Value::from("Carlos"));

        table.clear_all_filters();
        table.toggle_sort("plate");
        let view = table.view(&drivers);
        assert_eq!(view.filtered_data[1].plate, Value::Null);
    }
}
