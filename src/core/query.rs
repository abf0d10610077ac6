//! Search criteria, query planning and pagination
//!
//! [`plan`] is a pure function: it turns request-scoped [`SearchCriteria`]
//! into a [`SearchPlan`] (predicate, sort order and page window) that any
//! [`LodgingStore`](crate::core::store::LodgingStore) can execute.
//!
//! Predicates are additive-conjunctive. Every criterion that is *present*
//! narrows the result set, even when its value is empty; absent criteria
//! impose no constraint.
//!
//! # Example
//! ```rust,ignore
//! // GET /api/hotels/search?destination=lon&stars[]=4&stars[]=5&sortOption=pricePerNightAsc&page=2
//! let criteria = SearchCriteria::from_query_pairs(&pairs)?;
//! let plan = plan(&criteria)?;
//! let page = store.find(&plan.filter, plan.sort, plan.pagination.skip, plan.pagination.limit).await?;
//! ```

use crate::core::error::ValidationError;
use crate::core::lodging::LodgingRecord;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Fixed number of records per result page
pub const PAGE_SIZE: usize = 5;

/// The closed set of supported orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    /// Highest star rating first
    StarRating,
    /// Cheapest first
    PricePerNightAsc,
    /// Most expensive first
    PricePerNightDesc,
}

impl SortOption {
    /// Parse the wire name; unknown names mean "no ordering"
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "starRating" => Some(SortOption::StarRating),
            "pricePerNightAsc" => Some(SortOption::PricePerNightAsc),
            "pricePerNightDesc" => Some(SortOption::PricePerNightDesc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::StarRating => "starRating",
            SortOption::PricePerNightAsc => "pricePerNightAsc",
            SortOption::PricePerNightDesc => "pricePerNightDesc",
        }
    }
}

/// Request-scoped search parameters
///
/// `None` means the criterion was absent from the request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub destination: Option<String>,
    pub adult_count: Option<u32>,
    pub child_count: Option<u32>,
    pub facilities: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub star_ratings: Option<Vec<u8>>,
    pub max_price: Option<f64>,
    pub sort_option: Option<SortOption>,
    /// 1-based page number
    pub page: usize,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            destination: None,
            adult_count: None,
            child_count: None,
            facilities: None,
            types: None,
            star_ratings: None,
            max_price: None,
            sort_option: None,
            page: 1,
        }
    }
}

impl SearchCriteria {
    /// Build criteria from raw query-string pairs
    ///
    /// Keys may be repeated and may carry a `[]` suffix
    /// (`facilities[]=Spa&facilities[]=Parking`); a single value is
    /// treated as a one-element set. Malformed numbers are rejected, unknown
    /// keys and unknown sort options are ignored.
    pub fn from_query_pairs(pairs: &[(String, String)]) -> Result<Self, ValidationError> {
        let mut criteria = SearchCriteria::default();

        for (raw_key, value) in pairs {
            let key = raw_key.strip_suffix("[]").unwrap_or(raw_key);
            match key {
                "destination" => criteria.destination = Some(value.clone()),
                "adultCount" => criteria.adult_count = Some(parse_number(key, value)?),
                "childCount" => criteria.child_count = Some(parse_number(key, value)?),
                "facilities" => criteria
                    .facilities
                    .get_or_insert_with(Vec::new)
                    .push(value.clone()),
                "types" => criteria
                    .types
                    .get_or_insert_with(Vec::new)
                    .push(value.clone()),
                "stars" => criteria
                    .star_ratings
                    .get_or_insert_with(Vec::new)
                    .push(parse_number(key, value)?),
                "maxPrice" => {
                    let price: f64 = parse_number(key, value)?;
                    if !price.is_finite() {
                        return Err(ValidationError::field(key, "must be a finite number"));
                    }
                    criteria.max_price = Some(price);
                }
                "sortOption" => criteria.sort_option = SortOption::parse(value),
                "page" => criteria.page = parse_number::<usize>(key, value)?.max(1),
                _ => {}
            }
        }

        Ok(criteria)
    }
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::field(field, format!("'{}' is not a valid number", value)))
}

/// Case-insensitive literal match against city or country
#[derive(Debug, Clone)]
pub struct DestinationMatcher {
    text: String,
    regex: Regex,
}

impl DestinationMatcher {
    pub fn new(text: &str) -> Result<Self, ValidationError> {
        let regex = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
            .map_err(|e| ValidationError::field("destination", e.to_string()))?;
        Ok(Self {
            text: text.to_string(),
            regex,
        })
    }

    /// The user-supplied text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Escaped pattern suitable for a store-side regex
    pub fn pattern(&self) -> String {
        regex::escape(&self.text)
    }

    pub fn matches(&self, record: &LodgingRecord) -> bool {
        self.regex.is_match(&record.city) || self.regex.is_match(&record.country)
    }
}

impl PartialEq for DestinationMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

/// Conjunction of every active search predicate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LodgingFilter {
    pub destination: Option<DestinationMatcher>,
    pub min_adult_capacity: Option<u32>,
    pub min_child_capacity: Option<u32>,
    pub required_facilities: Option<BTreeSet<String>>,
    pub allowed_types: Option<BTreeSet<String>>,
    pub allowed_star_ratings: Option<BTreeSet<u8>>,
    pub max_price: Option<f64>,
}

impl LodgingFilter {
    /// Whether no predicate is active
    pub fn is_unconstrained(&self) -> bool {
        *self == LodgingFilter::default()
    }

    /// Evaluate every active predicate against one record
    pub fn matches(&self, record: &LodgingRecord) -> bool {
        self.destination.as_ref().is_none_or(|d| d.matches(record))
            && self
                .min_adult_capacity
                .is_none_or(|min| record.adult_count >= min)
            && self
                .min_child_capacity
                .is_none_or(|min| record.child_count >= min)
            && self
                .required_facilities
                .as_ref()
                .is_none_or(|required| required.iter().all(|f| record.facilities.contains(f)))
            && self
                .allowed_types
                .as_ref()
                .is_none_or(|types| types.contains(&record.lodging_type))
            && self
                .allowed_star_ratings
                .as_ref()
                .is_none_or(|stars| stars.contains(&record.star_rating))
            && self
                .max_price
                .is_none_or(|max| record.price_per_night <= max)
    }
}

/// Store-side ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortSpec {
    /// Insertion order
    #[default]
    Natural,
    StarRatingDesc,
    PriceAsc,
    PriceDesc,
}

impl SortSpec {
    /// Compare two records; `Equal` keeps insertion order under a stable sort
    pub fn compare(&self, a: &LodgingRecord, b: &LodgingRecord) -> Ordering {
        match self {
            SortSpec::Natural => Ordering::Equal,
            SortSpec::StarRatingDesc => b.star_rating.cmp(&a.star_rating),
            SortSpec::PriceAsc => a.price_per_night.total_cmp(&b.price_per_night),
            SortSpec::PriceDesc => b.price_per_night.total_cmp(&a.price_per_night),
        }
    }
}

impl From<Option<SortOption>> for SortSpec {
    fn from(option: Option<SortOption>) -> Self {
        match option {
            Some(SortOption::StarRating) => SortSpec::StarRatingDesc,
            Some(SortOption::PricePerNightAsc) => SortSpec::PriceAsc,
            Some(SortOption::PricePerNightDesc) => SortSpec::PriceDesc,
            None => SortSpec::Natural,
        }
    }
}

/// Page window over the sorted, filtered set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub page: usize,
    pub skip: usize,
    pub limit: usize,
}

impl Pagination {
    pub fn for_page(page: usize) -> Self {
        let page = page.max(1);
        Self {
            page,
            skip: (page - 1).saturating_mul(PAGE_SIZE),
            limit: PAGE_SIZE,
        }
    }
}

/// Everything a store needs to answer one search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub filter: LodgingFilter,
    pub sort: SortSpec,
    pub pagination: Pagination,
}

/// Translate search criteria into a store query. No I/O.
pub fn plan(criteria: &SearchCriteria) -> Result<SearchPlan, ValidationError> {
    let destination = criteria
        .destination
        .as_deref()
        .map(DestinationMatcher::new)
        .transpose()?;

    let filter = LodgingFilter {
        destination,
        min_adult_capacity: criteria.adult_count,
        min_child_capacity: criteria.child_count,
        required_facilities: criteria
            .facilities
            .as_ref()
            .map(|f| f.iter().cloned().collect()),
        allowed_types: criteria.types.as_ref().map(|t| t.iter().cloned().collect()),
        allowed_star_ratings: criteria
            .star_ratings
            .as_ref()
            .map(|s| s.iter().copied().collect()),
        max_price: criteria.max_price,
    };

    Ok(SearchPlan {
        filter,
        sort: criteria.sort_option.into(),
        pagination: Pagination::for_page(criteria.page),
    })
}

/// Paginated response structure
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// The records on the requested page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Total number of matching records
    pub total: usize,

    /// Current page number (starts at 1)
    pub page: usize,

    /// Total number of pages
    pub pages: usize,
}

impl PaginationMeta {
    pub fn new(page: usize, total: usize) -> Self {
        Self {
            total,
            page,
            pages: total.div_ceil(PAGE_SIZE),
        }
    }
}
