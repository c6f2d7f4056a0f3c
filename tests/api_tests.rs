// tests/api_tests.rs
//
// Integration tests against a live Postgres instance. Run them with a
// DATABASE_URL pointing at a disposable database:
//
//   DATABASE_URL=postgres://... cargo test -- --ignored

use blog_admin::{config::Config, routes, state::AppState, translator::Translator};
use blog_admin::utils::hash::hash_password;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the pool.
async fn spawn_app() -> (String, PgPool) {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    // 1. Create a pool
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        admin_email: None,
        admin_password: None,
        openai_api_key: None,
        openai_api_base: "https://api.openai.com/v1".to_string(),
        translator_model: "gpt-3.5-turbo".to_string(),
        upload_dir: std::env::temp_dir()
            .join("blog-admin-test-uploads")
            .to_string_lossy()
            .into_owned(),
        public_base_url: "http://127.0.0.1:3000".parse().unwrap(),
    };

    let translator = Translator::new(&config);
    let state = AppState {
        pool: pool.clone(),
        config,
        translator,
    };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Seeds an admin directly in the database and logs in through the API.
/// Returns (email, bearer token).
async fn seed_and_login(address: &str, pool: &PgPool) -> (String, String) {
    let email = format!("admin_{}@test.local", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    let password = "password123";
    let hashed = hash_password(password).expect("hash failed");

    sqlx::query("INSERT INTO users (email, password) VALUES ($1, $2)")
        .bind(&email)
        .bind(&hashed)
        .execute(pool)
        .await
        .expect("Failed to seed admin");

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Login request failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    let token = response["token"].as_str().expect("Token not found").to_string();
    (email, token)
}

fn sample_post_body(slug: &str) -> serde_json::Value {
    serde_json::json!({
        "title": { "vi": "Hướng dẫn bay flycam an toàn", "en": "Safe drone flying guide" },
        "excerpt": { "vi": "Tóm tắt ngắn" },
        "content": { "vi": "<h2>Mở đầu</h2><p>Nội dung chi tiết.</p>" },
        "slug": { "vi": slug },
        "image": "https://example.com/cover.jpg",
        "date": "2024-05-01",
        "author": "Biên tập viên",
        "category": "Hướng dẫn",
        "status": "published"
    })
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn unknown_route_is_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn login_rejects_wrong_password() {
    let (address, pool) = spawn_app().await;
    let (email, _token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn posts_require_authentication() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/posts", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn post_crud_round_trip() {
    let (address, pool) = spawn_app().await;
    let (_email, token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();
    let slug = format!("huong-dan-{}", uuid::Uuid::new_v4().simple());

    // Create
    let created: serde_json::Value = client
        .post(format!("{}/api/posts", address))
        .bearer_auth(&token)
        .json(&sample_post_body(&slug))
        .send()
        .await
        .expect("Create failed")
        .json()
        .await
        .expect("Create response was not JSON");

    let id = created["id"].as_str().expect("id missing").to_string();
    assert_eq!(created["title"]["vi"], "Hướng dẫn bay flycam an toàn");
    assert_eq!(created["slug"]["vi"], slug);
    assert_eq!(created["status"], "published");
    // English slug is derived from the English title.
    assert_eq!(created["slug"]["en"], "safe-drone-flying-guide");
    // Meta fields fall back to truncated title/excerpt.
    assert_eq!(created["meta_title"]["vi"], "Hướng dẫn bay flycam an toàn");

    // Fetch it back: every field survives the round trip.
    let fetched: serde_json::Value = client
        .get(format!("{}/api/posts/{}", address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Get failed")
        .json()
        .await
        .expect("Get response was not JSON");

    assert_eq!(fetched["title"], created["title"]);
    assert_eq!(fetched["content"], created["content"]);
    assert_eq!(fetched["category"], "Hướng dẫn");

    // The list contains it.
    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/api/posts?status=published", address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("List failed")
        .json()
        .await
        .expect("List response was not JSON");
    assert!(listed.iter().any(|p| p["id"] == created["id"]));

    // Toggle status through a partial update.
    let updated: serde_json::Value = client
        .put(format!("{}/api/posts/{}", address, id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "status": "draft" }))
        .send()
        .await
        .expect("Update failed")
        .json()
        .await
        .expect("Update response was not JSON");
    assert_eq!(updated["status"], "draft");
    assert_eq!(updated["slug"]["vi"], slug, "slug must not regenerate");

    // Delete is a hard delete.
    let response = client
        .delete(format!("{}/api/posts/{}", address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Delete failed");
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .get(format!("{}/api/posts/{}", address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Get after delete failed");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn duplicate_slug_conflicts() {
    let (address, pool) = spawn_app().await;
    let (_email, token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();
    let slug = format!("trung-slug-{}", uuid::Uuid::new_v4().simple());

    let first = client
        .post(format!("{}/api/posts", address))
        .bearer_auth(&token)
        .json(&sample_post_body(&slug))
        .send()
        .await
        .expect("First create failed");
    assert_eq!(first.status().as_u16(), 201);

    // Same Vietnamese slug but a different English title (and thus a
    // different derived English slug), so only slug_vi collides.
    let mut body = sample_post_body(&slug);
    body["title"]["en"] = serde_json::json!("Another English title entirely");
    let second = client
        .post(format!("{}/api/posts", address))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .expect("Second create failed");
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn dashboard_reports_stats() {
    let (address, pool) = spawn_app().await;
    let (_email, token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();

    let slug = format!("bai-thong-ke-{}", uuid::Uuid::new_v4().simple());
    client
        .post(format!("{}/api/posts", address))
        .bearer_auth(&token)
        .json(&sample_post_body(&slug))
        .send()
        .await
        .expect("Create failed");

    let dashboard: serde_json::Value = client
        .get(format!("{}/api/dashboard", address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Dashboard failed")
        .json()
        .await
        .expect("Dashboard response was not JSON");

    assert!(dashboard["stats"]["total_posts"].as_u64().unwrap() >= 1);
    assert!(dashboard["stats"]["recent_activity"].as_u64().unwrap() >= 1);
    assert!(dashboard["stats"]["top_category"].is_string());
    assert!(dashboard["recent_posts"].is_array());
    assert!(dashboard["categories"].is_array());
}

fn image_form(bytes: Vec<u8>, filename: &str, mime: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .expect("valid mime"),
    )
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn upload_rejects_non_image_files() {
    let (address, pool) = spawn_app().await;
    let (_email, token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/uploads", address))
        .bearer_auth(&token)
        .multipart(image_form(b"plain text".to_vec(), "ghi-chu.txt", "text/plain"))
        .send()
        .await
        .expect("Upload failed");

    assert_eq!(response.status().as_u16(), 415);
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn upload_rejects_images_over_five_megabytes() {
    let (address, pool) = spawn_app().await;
    let (_email, token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();

    // One byte over the cap.
    let oversized = vec![0u8; 5 * 1024 * 1024 + 1];
    let response = client
        .post(format!("{}/api/uploads", address))
        .bearer_auth(&token)
        .multipart(image_form(oversized, "to.png", "image/png"))
        .send()
        .await
        .expect("Upload failed");

    assert_eq!(response.status().as_u16(), 413);
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn upload_rejects_empty_files() {
    let (address, pool) = spawn_app().await;
    let (_email, token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/uploads", address))
        .bearer_auth(&token)
        .multipart(image_form(Vec::new(), "rong.png", "image/png"))
        .send()
        .await
        .expect("Upload failed");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn upload_stores_an_accepted_image_and_returns_its_url() {
    let (address, pool) = spawn_app().await;
    let (_email, token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();

    let png_header = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let response = client
        .post(format!("{}/api/uploads", address))
        .bearer_auth(&token)
        .multipart(image_form(png_header, "anh-bia.png", "image/png"))
        .send()
        .await
        .expect("Upload failed");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("Upload response was not JSON");
    let url = body["url"].as_str().expect("url missing");
    assert!(url.contains("/uploads/"));
    assert!(url.ends_with(".png"));
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn seo_check_reports_per_language_flags() {
    let (address, pool) = spawn_app().await;
    let (_email, token) = seed_and_login(&address, &pool).await;
    let client = reqwest::Client::new();

    let report: serde_json::Value = client
        .post(format!("{}/api/posts/seo", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": { "vi": "Một tiêu đề dài vừa đủ chuẩn SEO" },
            "excerpt": { "vi": "ngắn" },
            "content": { "vi": "<h2>Heading</h2><p>ngắn</p>" }
        }))
        .send()
        .await
        .expect("SEO check failed")
        .json()
        .await
        .expect("SEO response was not JSON");

    assert_eq!(report["vi"]["has_title"], true);
    assert_eq!(report["vi"]["has_headings"], true);
    assert_eq!(report["vi"]["has_meta_description"], false);
    // The English variant is empty, so every flag is false.
    assert_eq!(report["en"]["has_title"], false);
    assert_eq!(report["en"]["has_headings"], false);
}
