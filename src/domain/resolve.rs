use strsim::levenshtein;
use thiserror::Error;

const LITERAL_ID_MIN_LEN: usize = 20;
const SUGGESTION_MAX_DISTANCE: usize = 3;

/// Something a user can refer to by display name or by identifier.
pub trait NamedEntity {
    fn entity_id(&self) -> &str;
    fn display_name(&self) -> &str;
}

/// A named entity that carries an optimistic-concurrency token. Missing tokens read as `""`.
pub trait VersionedEntity: NamedEntity {
    fn etag(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(
        "Multiple {entity_type}s match '{query}': {}. Use a more specific name or the full ID.",
        .names.join(", ")
    )]
    AmbiguousMatch {
        entity_type: String,
        query: String,
        names: Vec<String>,
    },
    #[error(
        "No {entity_type} found matching '{query}'{}",
        .suggestion.as_ref().map(|name| format!(". Did you mean '{name}'?")).unwrap_or_default()
    )]
    NotFound {
        entity_type: String,
        query: String,
        suggestion: Option<String>,
    },
}

enum Resolution<'a, T> {
    Literal,
    Matched(&'a T),
}

/// True when `query` looks like a backend identifier rather than a name.
pub fn is_literal_id(query: &str) -> bool {
    query.len() >= LITERAL_ID_MIN_LEN && query.chars().all(|ch| ch.is_ascii_hexdigit())
}

/// Resolves `query` to an identifier: literal id, then exact name, then unique substring.
pub fn resolve_name<T: NamedEntity>(
    query: &str,
    items: &[T],
    entity_type: &str,
) -> Result<String, ResolveError> {
    match locate(query, items, entity_type)? {
        Resolution::Literal => Ok(query.to_string()),
        Resolution::Matched(item) => Ok(item.entity_id().to_string()),
    }
}

/// Same as [`resolve_name`] but also returns the entity's current etag.
///
/// A literal identifier absent from `items` passes through with an empty etag.
pub fn resolve_name_with_etag<T: VersionedEntity>(
    query: &str,
    items: &[T],
    entity_type: &str,
) -> Result<(String, String), ResolveError> {
    match locate(query, items, entity_type)? {
        Resolution::Literal => {
            let etag = items
                .iter()
                .find(|item| item.entity_id() == query)
                .map(|item| item.etag().to_string())
                .unwrap_or_default();
            Ok((query.to_string(), etag))
        }
        Resolution::Matched(item) => Ok((item.entity_id().to_string(), item.etag().to_string())),
    }
}

fn locate<'a, T: NamedEntity>(
    query: &str,
    items: &'a [T],
    entity_type: &str,
) -> Result<Resolution<'a, T>, ResolveError> {
    if is_literal_id(query) {
        return Ok(Resolution::Literal);
    }

    let needle = query.to_lowercase();
    if let Some(item) = items
        .iter()
        .find(|item| item.display_name().to_lowercase() == needle)
    {
        return Ok(Resolution::Matched(item));
    }

    let matches: Vec<&T> = items
        .iter()
        .filter(|item| item.display_name().to_lowercase().contains(&needle))
        .collect();

    match matches.as_slice() {
        [single] => Ok(Resolution::Matched(*single)),
        [] => Err(ResolveError::NotFound {
            entity_type: entity_type.to_string(),
            query: query.to_string(),
            suggestion: closest_name(&needle, items),
        }),
        _ => Err(ResolveError::AmbiguousMatch {
            entity_type: entity_type.to_string(),
            query: query.to_string(),
            names: matches
                .iter()
                .map(|item| item.display_name().to_string())
                .collect(),
        }),
    }
}

fn closest_name<T: NamedEntity>(needle: &str, items: &[T]) -> Option<String> {
    let mut best: Option<(usize, &str)> = None;
    for item in items {
        let distance = levenshtein(needle, &item.display_name().to_lowercase());
        // Strict comparison keeps the earliest candidate on ties.
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, item.display_name()));
        }
    }

    best.filter(|(distance, _)| *distance <= SUGGESTION_MAX_DISTANCE)
        .map(|(_, name)| name.to_string())
}
