//! Navigation between the views
//!
//! Locations use the web client's paths so a result can be addressed as
//! `/result?rid=<id>`, e.g. from the command line.

use std::fmt;
use thiserror::Error;
use url::Url;

const BASE: &str = "codedock://app";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Editor,
    Assistant,
    Result {
        rid: Option<String>,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid location {0:?}")]
    Invalid(String),
    #[error("unknown page {0:?}")]
    UnknownPage(String),
}

impl Route {
    pub fn result(rid: impl Into<String>) -> Self {
        Route::Result {
            rid: Some(rid.into()),
        }
    }

    /// Parse a location such as `/editor` or `/result?rid=abc`.
    pub fn parse(location: &str) -> Result<Self, RouteError> {
        let base = Url::parse(BASE).map_err(|_| RouteError::Invalid(location.to_string()))?;
        let url = base
            .join(location.trim())
            .map_err(|_| RouteError::Invalid(location.to_string()))?;

        match url.path().trim_end_matches('/') {
            "" | "/editor" => Ok(Route::Editor),
            "/assistant" => Ok(Route::Assistant),
            "/result" => {
                let rid = url
                    .query_pairs()
                    .find(|(k, _)| k == "rid")
                    .map(|(_, v)| v.into_owned())
                    .filter(|v| !v.is_empty());
                Ok(Route::Result { rid })
            }
            other => Err(RouteError::UnknownPage(other.to_string())),
        }
    }

    /// Header tab index
    pub fn tab_index(&self) -> usize {
        match self {
            Route::Editor => 0,
            Route::Assistant => 1,
            Route::Result { .. } => 2,
        }
    }

    pub fn rid(&self) -> Option<&str> {
        match self {
            Route::Result { rid } => rid.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Editor => write!(f, "/editor"),
            Route::Assistant => write!(f, "/assistant"),
            Route::Result { rid: None } => write!(f, "/result"),
            Route::Result { rid: Some(rid) } => {
                let query: String = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("rid", rid)
                    .finish();
                write!(f, "/result?{}", query)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pages() {
        assert_eq!(Route::parse("/editor").unwrap(), Route::Editor);
        assert_eq!(Route::parse("/").unwrap(), Route::Editor);
        assert_eq!(Route::parse("/assistant/").unwrap(), Route::Assistant);
        assert_eq!(Route::parse("/result").unwrap(), Route::Result { rid: None });
    }

    #[test]
    fn test_parse_result_query() {
        assert_eq!(Route::parse("/result?rid=k3j9x0aa").unwrap(), Route::result("k3j9x0aa"));
        assert_eq!(Route::parse("/result?rid=").unwrap(), Route::Result { rid: None });
        assert_eq!(
            Route::parse("/result?other=1&rid=abc").unwrap(),
            Route::result("abc")
        );
    }

    #[test]
    fn test_display_round_trips() {
        for route in [
            Route::Editor,
            Route::Assistant,
            Route::Result { rid: None },
            Route::result("a1b2c3d4"),
        ] {
            assert_eq!(Route::parse(&route.to_string()).unwrap(), route);
        }
        assert_eq!(Route::result("x y").to_string(), "/result?rid=x+y");
    }

    #[test]
    fn test_unknown_page() {
        assert_eq!(
            Route::parse("/settings"),
            Err(RouteError::UnknownPage("/settings".into()))
        );
    }
}
