//! OMDb API client for movie lookups.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const NOT_FOUND_REPLY: &str = "Movie not found. Try another title.";

/// Anything that can resolve a title to movie metadata.
pub trait MovieLookup: Send + Sync {
    fn lookup(&self, title: &str) -> impl Future<Output = Result<LookupResult, LookupError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub year: String,
    pub rating: String,
    pub plot: String,
    pub genre: String,
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🎬 {} ({})\n⭐ Rating: {}/10\n📖 Plot: {}\n🎭 Genre: {}",
            self.title, self.year, self.rating, self.plot, self.genre
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found(Movie),
    NotFound,
}

impl LookupResult {
    /// Text shown to the user for this result.
    pub fn reply_text(&self) -> String {
        match self {
            LookupResult::Found(movie) => movie.to_string(),
            LookupResult::NotFound => NOT_FOUND_REPLY.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum LookupError {
    /// The request could not complete (connect failure, timeout, truncated body).
    Transport(String),
    /// The body was not the JSON shape OMDb documents.
    Format(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Transport(e) => write!(f, "transport error: {e}"),
            LookupError::Format(e) => write!(f, "format error: {e}"),
        }
    }
}

impl std::error::Error for LookupError {}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

pub struct OmdbClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OmdbClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, reqwest::Error> {
        Self::with_timeout(api_key, base_url, REQUEST_TIMEOUT)
    }

    pub(crate) fn with_timeout(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn request_url(&self, title: &str) -> String {
        format!(
            "{}/?apikey={}&t={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(title)
        )
    }

    /// Search OMDb for an exact title.
    pub async fn search(&self, title: &str) -> Result<LookupResult, LookupError> {
        info!("🔎 Looking up movie: {}", title);

        // OMDb reports bad keys and unknown titles in the JSON body; the status is only logged.
        let response = self
            .http
            .get(self.request_url(title))
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.without_url().to_string()))?;

        debug!("OMDb response status: {status}");

        parse_response(&body)
    }
}

impl MovieLookup for OmdbClient {
    async fn lookup(&self, title: &str) -> Result<LookupResult, LookupError> {
        self.search(title).await
    }
}

fn parse_response(body: &str) -> Result<LookupResult, LookupError> {
    let parsed: ApiResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Format(e.to_string()))?;

    if parsed.response != "True" {
        debug!(
            "OMDb returned no match: {}",
            parsed.error.as_deref().unwrap_or("no error message")
        );
        return Ok(LookupResult::NotFound);
    }

    let movie = Movie {
        title: parsed.title.ok_or(LookupError::Format("missing Title".into()))?,
        year: parsed.year.ok_or(LookupError::Format("missing Year".into()))?,
        rating: parsed.imdb_rating.ok_or(LookupError::Format("missing imdbRating".into()))?,
        plot: parsed.plot.ok_or(LookupError::Format("missing Plot".into()))?,
        genre: parsed.genre.ok_or(LookupError::Format("missing Genre".into()))?,
    };

    info!("🎬 Found: {} ({})", movie.title, movie.year);
    Ok(LookupResult::Found(movie))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INCEPTION_REPLY: &str = "🎬 Inception (2010)\n⭐ Rating: 8.8/10\n📖 Plot: A thief...\n🎭 Genre: Action, Sci-Fi";

    fn inception_json() -> serde_json::Value {
        json!({
            "Response": "True",
            "Title": "Inception",
            "Year": "2010",
            "imdbRating": "8.8",
            "Plot": "A thief...",
            "Genre": "Action, Sci-Fi",
            "Director": "Christopher Nolan"
        })
    }

    fn client_for(server: &MockServer) -> OmdbClient {
        OmdbClient::new("test-key".to_string(), server.uri()).unwrap()
    }

    #[test]
    fn test_found_formats_template_exactly() {
        let result = parse_response(&inception_json().to_string()).unwrap();
        assert_eq!(result.reply_text(), INCEPTION_REPLY);
    }

    #[test]
    fn test_response_false_is_not_found() {
        let body = json!({"Response": "False", "Error": "Movie not found!"}).to_string();
        let result = parse_response(&body).unwrap();
        assert_eq!(result, LookupResult::NotFound);
        assert_eq!(result.reply_text(), "Movie not found. Try another title.");
    }

    #[test]
    fn test_invalid_key_is_not_found() {
        let body = json!({"Response": "False", "Error": "Invalid API key!"}).to_string();
        assert_eq!(parse_response(&body).unwrap(), LookupResult::NotFound);
    }

    #[test]
    fn test_non_json_is_format_error() {
        let err = parse_response("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, LookupError::Format(_)));
    }

    #[test]
    fn test_missing_response_field_is_format_error() {
        let err = parse_response(r#"{"Title": "Inception"}"#).unwrap_err();
        assert!(matches!(err, LookupError::Format(_)));
    }

    #[test]
    fn test_found_without_required_field_is_format_error() {
        let body = json!({"Response": "True", "Title": "Inception", "Year": "2010"}).to_string();
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, LookupError::Format(ref m) if m.contains("imdbRating")));
    }

    #[test]
    fn test_request_url_encodes_title() {
        let client = OmdbClient::new("k&y".to_string(), "http://www.omdbapi.com/".to_string()).unwrap();
        assert_eq!(
            client.request_url("Fast & Furious #7"),
            "http://www.omdbapi.com/?apikey=k%26y&t=Fast%20%26%20Furious%20%237"
        );
    }

    #[tokio::test]
    async fn test_lookup_sends_key_and_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("t", "Inception"))
            .respond_with(ResponseTemplate::new(200).set_body_json(inception_json()))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).lookup("Inception").await.unwrap();
        assert_eq!(result.reply_text(), INCEPTION_REPLY);
    }

    #[tokio::test]
    async fn test_lookup_decodes_special_characters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("t", "Amélie & Co"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Response": "False", "Error": "Movie not found!"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).lookup("Amélie & Co").await.unwrap();
        assert_eq!(result, LookupResult::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_error_status_with_json_body_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"Response": "False", "Error": "Invalid API key!"})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).lookup("Inception").await.unwrap();
        assert_eq!(result, LookupResult::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_garbage_body_is_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server).lookup("Inception").await.unwrap_err();
        assert!(matches!(err, LookupError::Format(_)));
    }

    #[test]
    fn test_request_timeout_is_ten_seconds() {
        assert_eq!(REQUEST_TIMEOUT, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_lookup_slow_server_times_out_as_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(inception_json())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = OmdbClient::with_timeout(
            "test-key".to_string(),
            server.uri(),
            Duration::from_millis(50),
        )
        .unwrap();
        let err = client.lookup("Inception").await.unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
    }

    #[tokio::test]
    async fn test_lookup_unreachable_server_is_transport_error() {
        // Bind then release a port so nothing is listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = OmdbClient::new("test-key".to_string(), format!("http://127.0.0.1:{port}")).unwrap();
        let err = client.lookup("Inception").await.unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
        assert!(!err.to_string().contains("test-key"));
    }
}
