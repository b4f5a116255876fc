//! Integration tests for the studio backend.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::Sessions;
use crate::config::{Config, TaxonomyDeletePolicy};
use crate::db::{init_database, Repository};
use crate::media::MediaStore;
use crate::migrate::{LegacyImporter, LEGACY_PROJECTS_FILE};
use crate::services::{ContentService, PortfolioService, TeamService};
use crate::{create_router, AppState};

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .try_init();
});

const TEST_PASSWORD: &str = "test-password";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    legacy_dir: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestFixture {
    /// Server with auth configured and a logged-in default client.
    async fn new() -> Self {
        Self::with_password(Some(TEST_PASSWORD.to_string())).await
    }

    async fn with_password(password: Option<String>) -> Self {
        Lazy::force(&TRACING);

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let media_dir = temp_dir.path().join("media");
        let legacy_dir = temp_dir.path().join("legacy");
        std::fs::create_dir_all(&media_dir).expect("Failed to create media dir");
        std::fs::create_dir_all(&legacy_dir).expect("Failed to create legacy dir");

        // Bind first so the public base URL matches the actual address
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Repository::new(pool);

        let config = Config {
            admin_password: password.clone(),
            db_path,
            media_dir: media_dir.clone(),
            legacy_dir: legacy_dir.clone(),
            public_base_url: base_url.clone(),
            bind_addr: addr,
            cache_ttl: Duration::from_secs(300),
            taxonomy_delete: TaxonomyDeletePolicy::AllowOrphan,
            log_level: "warn".to_string(),
        };

        let media = Arc::new(MediaStore::new(media_dir, &config.public_base_url));
        let portfolio = Arc::new(PortfolioService::new(
            repo.clone(),
            config.cache_ttl,
            config.taxonomy_delete,
        ));
        let team = Arc::new(TeamService::new(repo.clone()));
        let content = Arc::new(ContentService::new(repo));
        let importer = Arc::new(LegacyImporter::new(
            portfolio.clone(),
            team.clone(),
            content.clone(),
            legacy_dir.clone(),
        ));

        let state = AppState {
            portfolio,
            team,
            content,
            media,
            importer,
            sessions: Sessions::new(),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Log in and pin the session token as a default header
        let mut client_builder = Client::builder();
        if let Some(password) = password {
            let resp = Client::new()
                .post(format!("{}/api/auth/login", base_url))
                .json(&json!({ "password": password }))
                .send()
                .await
                .expect("Login request failed");
            assert_eq!(resp.status(), 200);
            let body: Value = resp.json().await.unwrap();
            let token = body["data"]["token"].as_str().unwrap();

            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token).parse().unwrap(),
            );
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            legacy_dir,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_project(&self, title: &str, category: &str, featured: bool) -> Value {
        let resp = self
            .client
            .post(self.url("/api/projects"))
            .json(&json!({
                "title": title,
                "category": category,
                "description": format!("{} case study", title),
                "tags": ["identity"],
                "featured": featured,
                "year": "2025"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let fixture = TestFixture::new().await;

    // No token
    let resp = Client::new()
        .post(fixture.url("/api/projects"))
        .json(&json!({ "title": "X", "category": "branding" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // Bogus token
    let resp = Client::new()
        .post(fixture.url("/api/projects"))
        .header("authorization", "Bearer not-a-session")
        .json(&json!({ "title": "X", "category": "branding" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_public_routes_do_not_require_session() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The revoked token no longer admits
    let resp = fixture
        .client
        .post(fixture.url("/api/projects"))
        .json(&json!({ "title": "X", "category": "branding" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_dev_mode_allows_writes_without_session() {
    let fixture = TestFixture::with_password(None).await;

    let body = fixture.create_project("Open Door", "branding", false).await;
    assert_eq!(body["data"]["title"], "Open Door");

    // Login itself reports that auth is not configured
    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({ "password": "anything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_project_crud() {
    let fixture = TestFixture::new().await;

    // Create
    let create_body = fixture.create_project("Harbor Rebrand", "branding", false).await;
    assert_eq!(create_body["success"], true);
    let project_id = create_body["data"]["id"].as_i64().unwrap();
    assert!(project_id > 0);
    assert!(create_body["data"]["createdAt"].is_string());
    assert_eq!(
        create_body["data"]["createdAt"],
        create_body["data"]["updatedAt"]
    );

    // Get
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/projects/{}", project_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let get_body: Value = resp.json().await.unwrap();
    assert_eq!(get_body["data"]["title"], "Harbor Rebrand");

    // Update
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/projects/{}", project_id)))
        .json(&json!({ "title": "Harbor Identity", "featured": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let update_body: Value = resp.json().await.unwrap();
    assert_eq!(update_body["data"]["title"], "Harbor Identity");
    assert_eq!(update_body["data"]["featured"], true);
    // Untouched fields survive a partial update
    assert_eq!(update_body["data"]["category"], "branding");

    // List
    let resp = fixture
        .client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    let list_body: Value = resp.json().await.unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    // Delete
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/projects/{}", project_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // A second delete reports NotFound instead of panicking
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/projects/{}", project_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // And the list no longer includes it
    let resp = fixture
        .client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    let list_body: Value = resp.json().await.unwrap();
    assert!(list_body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_project_filters() {
    let fixture = TestFixture::new().await;

    fixture.create_project("One", "branding", true).await;
    fixture.create_project("Two", "branding", false).await;
    fixture.create_project("Three", "editorial", false).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/projects?category=branding"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let resp = fixture
        .client
        .get(fixture.url("/api/projects?category=all"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let resp = fixture
        .client
        .get(fixture.url("/api/projects?featured=true"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let featured = body["data"].as_array().unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0]["title"], "One");
}

#[tokio::test]
async fn test_replace_projects() {
    let fixture = TestFixture::new().await;

    fixture.create_project("Old One", "branding", false).await;
    fixture.create_project("Old Two", "branding", false).await;

    let resp = fixture
        .client
        .put(fixture.url("/api/projects"))
        .json(&json!({
            "projects": [
                { "title": "New Only", "category": "editorial", "year": "2025" }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let projects = body["data"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["title"], "New Only");

    // Replace with nothing empties the table
    let resp = fixture
        .client
        .put(fixture.url("/api/projects"))
        .json(&json!({ "projects": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_colors_flow_to_cards() {
    let fixture = TestFixture::new().await;

    // Admin adds a category
    let resp = fixture
        .client
        .post(fixture.url("/api/categories"))
        .json(&json!({ "label": "Branding", "color": "#4A90E2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], "branding");
    assert_eq!(body["data"]["label"], "Branding");
    assert_eq!(body["data"]["color"], "#4A90E2");

    // A project tagged with that category picks the color up on its card
    fixture.create_project("Harbor Rebrand", "branding", false).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/projects/cards"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let cards = body["data"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["categoryLabel"], "Branding");
    assert_eq!(cards[0]["categoryColor"], "#4A90E2");
    // The tag has no taxonomy entry, so its color is the neutral fallback
    assert_eq!(cards[0]["tagColors"][0], "#9CA3AF");
}

#[tokio::test]
async fn test_tag_crud() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/tags"))
        .json(&json!({ "name": "Identity", "color": "#D0021B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], "identity");

    // Duplicate slugs conflict
    let resp = fixture
        .client
        .post(fixture.url("/api/tags"))
        .json(&json!({ "name": "identity", "color": "#000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CONFLICT");

    let resp = fixture
        .client
        .put(fixture.url("/api/tags/identity"))
        .json(&json!({ "color": "#FF0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["color"], "#FF0000");
    assert_eq!(body["data"]["name"], "Identity");

    let resp = fixture
        .client
        .get(fixture.url("/api/tags"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .client
        .delete(fixture.url("/api/tags/identity"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .delete(fixture.url("/api/tags/identity"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_member_crud_and_skills() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/members"))
        .json(&json!({
            "id": "mika",
            "name": "Mika",
            "role": "Designer",
            "bio": "Joined in 2023.",
            "skills": ["Layout"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], "mika");

    let resp = fixture
        .client
        .post(fixture.url("/api/members/mika/skills"))
        .json(&json!({ "skill": "Identity" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["skills"], json!(["Layout", "Identity"]));

    let resp = fixture
        .client
        .put(fixture.url("/api/members/mika/skills"))
        .json(&json!({ "from": "Layout", "to": "Editorial Layout" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["skills"][0], "Editorial Layout");

    let resp = fixture
        .client
        .delete(fixture.url("/api/members/mika/skills"))
        .json(&json!({ "skill": "Identity" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["skills"], json!(["Editorial Layout"]));

    let resp = fixture
        .client
        .delete(fixture.url("/api/members/mika"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/members/mika"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_content_roundtrip() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/content/about.profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .put(fixture.url("/api/content/about.profile"))
        .json(&json!({ "value": { "text": "A small design studio." } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/content/about.profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["value"]["text"], "A small design studio.");
}

#[tokio::test]
async fn test_media_upload_validation() {
    let fixture = TestFixture::new().await;

    // Wrong MIME type, regardless of size
    let part = Part::bytes(vec![0u8; 64])
        .file_name("image.bmp")
        .mime_str("image/bmp")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/media"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Oversized PNG
    let part = Part::bytes(vec![0u8; 11 * 1024 * 1024])
        .file_name("big.png")
        .mime_str("image/png")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/media"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_media_upload_serve_and_delete() {
    let fixture = TestFixture::new().await;

    let part = Part::bytes(b"<svg xmlns='http://www.w3.org/2000/svg'/>".to_vec())
        .file_name("logo.svg")
        .mime_str("image/svg+xml")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/media"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.contains("/media/"));
    assert!(url.ends_with(".svg"));

    // The public URL serves the bytes back
    let resp = Client::new().get(&url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("svg"));

    // Delete by URL
    let resp = fixture
        .client
        .delete(fixture.url("/api/media"))
        .json(&json!({ "url": url }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = Client::new().get(&url).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_migration_endpoint() {
    let fixture = TestFixture::new().await;

    let legacy_path = fixture.legacy_dir.join(LEGACY_PROJECTS_FILE);
    std::fs::write(
        &legacy_path,
        json!([
            { "id": 7, "title": "Harbor Rebrand", "category": "branding", "year": "2021" },
            { "id": 8, "title": "Ember Packaging", "category": "packaging" }
        ])
        .to_string(),
    )
    .unwrap();

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/migrate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["projectsImported"], 2);
    assert!(!legacy_path.exists());

    let resp = fixture
        .client
        .get(fixture.url("/api/projects"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // A second run finds nothing to import
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/migrate"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["projectsImported"], 0);
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;

    // Project with an empty title
    let resp = fixture
        .client
        .post(fixture.url("/api/projects"))
        .json(&json!({ "title": "", "category": "branding" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Category whose label slugs to nothing
    let resp = fixture
        .client
        .post(fixture.url("/api/categories"))
        .json(&json!({ "label": "***", "color": "#4A90E2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/projects/9999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let resp = fixture
        .client
        .get(fixture.url("/api/members/nonexistent"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
