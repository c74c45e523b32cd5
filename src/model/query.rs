use crate::model::Selector;

/// Raw query-string pairs, in request order
pub type QueryPairs = Vec<(String, String)>;

/// First non-empty value for `name`. Empty values read as absent.
pub fn first_value<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .find(|value| !value.is_empty())
}

/// First value for `name`, empty or not
pub fn first_raw_value<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Optional filters accepted by the dealership search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealershipParams {
    pub state: Option<String>,
    pub id: Option<String>,
}

impl DealershipParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            state: first_value(pairs, "state").map(str::to_string),
            id: first_value(pairs, "id").map(str::to_string),
        }
    }

    /// `state` filters on `state`, `id` on the document `_id`, both verbatim
    pub fn selector(&self) -> Selector {
        Selector::new()
            .with_optional("state", self.state.clone())
            .with_optional("_id", self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewParamsError {
    MissingId,
    InvalidId,
}

impl std::fmt::Display for ReviewParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewParamsError::MissingId => write!(f, "Missing 'id' parameter in the URL"),
            ReviewParamsError::InvalidId => write!(f, "'id' parameter must be an integer"),
        }
    }
}

/// The dealership whose reviews are requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewParams {
    pub dealership: i64,
}

impl ReviewParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ReviewParamsError> {
        // Empty counts as present, so `?id=` fails to parse
        let raw = first_raw_value(pairs, "id").ok_or(ReviewParamsError::MissingId)?;
        let dealership = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ReviewParamsError::InvalidId)?;
        Ok(Self { dealership })
    }

    pub fn selector(&self) -> Selector {
        Selector::new().with("dealership", self.dealership)
    }
}
