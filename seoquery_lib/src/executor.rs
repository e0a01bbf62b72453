//! Turns a [`FetchRequest`] into one API call per report and maps the
//! returned page into view rows.

use seoquery_api::types::Page;
use seoquery_api::{
    BacklinkMode, BacklinksQuery, Client, DomainIntersectionQuery, KeywordIdeasQuery, Query,
    RankedKeywordsQuery,
};

use crate::error::SeoQueryError;
use crate::pagination::Pagination;
use crate::rows::{BacklinkRow, GapRow, KeywordRow, RankedKeywordRow};
use crate::schema::Report;
use crate::session::FetchRequest;
use crate::validation;

/// Location and language applied to keyword reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub location_code: u32,
    pub language_code: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            location_code: 2840,
            language_code: "en".to_string(),
        }
    }
}

impl Locale {
    /// Validates raw codes, e.g. from command-line flags.
    pub fn parse(location_code: i64, language_code: &str) -> Result<Self, SeoQueryError> {
        Ok(Self {
            location_code: validation::validate_location_code(location_code)?,
            language_code: validation::validate_language_code(language_code)?,
        })
    }
}

/// One page of rows, tagged with the generation of the request that
/// produced it.
#[derive(Debug, Clone)]
pub struct Fetched<R> {
    pub generation: u64,
    pub page: u32,
    pub total_count: i64,
    pub rows: Vec<R>,
}

impl<R> Fetched<R> {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.total_count)
    }
}

/// Builds report queries from filter state and runs them against the API.
///
/// Holds no cache; every call issues exactly one request.
pub struct QueryExecutor {
    client: Client,
    locale: Locale,
}

impl QueryExecutor {
    pub fn new(client: Client, locale: Locale) -> Self {
        Self { client, locale }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Keyword ideas for one or more seed keywords.
    pub async fn keyword_ideas(
        &self,
        seeds: &[String],
        request: &FetchRequest,
    ) -> Result<Fetched<KeywordRow>, SeoQueryError> {
        let seeds = validation::validate_keywords(seeds)?;
        let query = KeywordIdeasQuery::default().with_keywords(&seeds);
        let query = self.prepare(query, Report::KeywordIdeas, request)?;
        tracing::debug!("keyword ideas for {} seed(s), page {}", seeds.len(), request.page);
        let page = self.client.keyword_ideas(&query).await.map_err(request_error)?;
        Ok(fetched(request, page, |item| KeywordRow::from(item)))
    }

    /// Keywords a domain ranks for.
    pub async fn ranked_keywords(
        &self,
        target: &str,
        request: &FetchRequest,
    ) -> Result<Fetched<RankedKeywordRow>, SeoQueryError> {
        let target = validation::normalize_target(target)?;
        let query = self.prepare(RankedKeywordsQuery::new(&target), Report::RankedKeywords, request)?;
        tracing::debug!("ranked keywords for {}, page {}", target, request.page);
        let page = self.client.ranked_keywords(&query).await.map_err(request_error)?;
        Ok(fetched(request, page, |item| RankedKeywordRow::from(item)))
    }

    /// Keywords shared by two domains, or, with `intersections` off, the
    /// keywords `first` ranks for that `second` does not.
    pub async fn keyword_gap(
        &self,
        first: &str,
        second: &str,
        intersections: bool,
        request: &FetchRequest,
    ) -> Result<Fetched<GapRow>, SeoQueryError> {
        let first = validation::normalize_target(first)?;
        let second = validation::normalize_target(second)?;
        if first == second {
            return Err(SeoQueryError::InvalidInput(
                "keyword gap needs two different domains".to_string(),
            ));
        }
        let query = DomainIntersectionQuery::new(&first, &second).with_intersections(intersections);
        let query = self.prepare(query, Report::KeywordGap, request)?;
        tracing::debug!("keyword gap {} vs {}, page {}", first, second, request.page);
        let page = self.client.domain_intersection(&query).await.map_err(request_error)?;
        Ok(fetched(request, page, |item| GapRow::from(item)))
    }

    /// Backlinks pointing at a domain or page.
    pub async fn backlinks(
        &self,
        target: &str,
        mode: BacklinkMode,
        request: &FetchRequest,
    ) -> Result<Fetched<BacklinkRow>, SeoQueryError> {
        let target = validation::normalize_target(target)?;
        let query = BacklinksQuery::new(&target).with_mode(mode);
        let query = self.prepare(query, Report::Backlinks, request)?;
        tracing::debug!("backlinks for {} ({}), page {}", target, mode, request.page);
        let page = self.client.backlinks(&query).await.map_err(request_error)?;
        Ok(fetched(request, page, |item| BacklinkRow::from(item)))
    }

    /// Applies locale, compiled filters, sort, and page to a query.
    fn prepare<Q: Query>(
        &self,
        query: Q,
        report: Report,
        request: &FetchRequest,
    ) -> Result<Q, SeoQueryError> {
        let sort = match &request.sort {
            Some(sort) => report.resolve_sort(sort)?,
            None => report.resolve_sort(&report.default_sort())?,
        };
        let mut query = query
            .with_location_code(self.locale.location_code)
            .with_language_code(&self.locale.language_code)
            .with_order_by(sort)
            .with_page(request.page);
        if let Some(expr) = request.filters.compile(&report.fields())? {
            query = query.with_filters(expr);
        }
        Ok(query)
    }
}

/// A filter tree the client refuses to send (such as one over the clause
/// limit) is bad input; everything else stays an API error.
fn request_error(e: seoquery_api::Error) -> SeoQueryError {
    match e {
        seoquery_api::Error::InvalidFilter(msg) => SeoQueryError::InvalidInput(msg),
        other => SeoQueryError::Api(other),
    }
}

fn fetched<T, R>(request: &FetchRequest, page: Page<T>, map: impl Fn(&T) -> R) -> Fetched<R> {
    Fetched {
        generation: request.generation,
        page: request.page,
        total_count: page.total_count,
        rows: page.items.iter().map(map).collect(),
    }
}
