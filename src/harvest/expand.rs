use crate::terms::TermCatalog;

use super::QueryText;

/// One independently paginated search: an optional type filter and a keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStream {
    pub included_type: Option<String>,
    pub keyword: String,
}

/// Cross product of included types and keywords, types outermost.
///
/// With no included types every keyword runs once without a type filter.
pub fn expand(included_types: &[String], keywords: &[String]) -> Vec<QueryStream> {
    let types: Vec<Option<&String>> = if included_types.is_empty() {
        vec![None]
    } else {
        included_types.iter().map(Some).collect()
    };

    types
        .into_iter()
        .flat_map(|included_type| {
            keywords.iter().map(move |keyword| QueryStream {
                included_type: included_type.cloned(),
                keyword: keyword.clone(),
            })
        })
        .collect()
}

/// Build the query streams for a request.
///
/// Freetext bypasses the term catalogue. A category with no keywords falls
/// back to the category string itself, so at least one stream always runs.
pub fn plan_streams(catalog: &TermCatalog, query: &QueryText, language: &str) -> Vec<QueryStream> {
    match query {
        QueryText::Freetext(text) => expand(&[], &[text.clone()]),
        QueryText::Category(category) => {
            let resolved = catalog.resolve(category, language);
            let keywords = if resolved.keywords.is_empty() {
                vec![category.clone()]
            } else {
                resolved.keywords
            };
            expand(&resolved.included_types, &keywords)
        }
    }
}
