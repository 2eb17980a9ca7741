use async_trait::async_trait;
use axum::{
    Form,
    body::to_bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use inkblog::{
    AppState,
    auth::{AdminSession, AuthContext},
    config::AppConfig,
    credentials, handlers,
    models::{Admin, LoginForm, Post, PostDetail, PostForm, PostId, RegisterForm},
    repository::Repository,
};
use std::sync::{Arc, Mutex};

// --- MOCK REPOSITORY IMPLEMENTATION ---

// An in-memory stand-in for SQLite. Handlers only see the trait, so the mock
// records what they wrote and serves it back.
#[derive(Default)]
pub struct MockRepoControl {
    pub posts: Mutex<Vec<Post>>,
    pub admins: Mutex<Vec<Admin>>,
    pub like_calls: Mutex<u32>,
}

impl MockRepoControl {
    fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Repository for MockRepoControl {
    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error> {
        Ok(self.posts.lock().unwrap().clone())
    }
    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>, sqlx::Error> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.author_id == Some(author_id))
            .cloned()
            .collect())
    }
    async fn get_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }
    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, sqlx::Error> {
        Ok(self.get_post(id).await?.map(|post| PostDetail {
            post,
            author_username: Some("alice".to_string()),
        }))
    }
    async fn create_post(&self, title: &str, content: &str, author_id: i64) -> Result<Post, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        let post = Post {
            id: posts.len() as i64 + 1,
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now().naive_utc(),
            likes: 0,
            author_id: Some(author_id),
        };
        posts.push(post.clone());
        Ok(post)
    }
    async fn update_post(&self, id: i64, title: &str, content: &str) -> Result<bool, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        match posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.title = title.to_string();
                post.content = content.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
    async fn delete_post(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }
    async fn like_post(&self, id: i64) -> Result<bool, sqlx::Error> {
        *self.like_calls.lock().unwrap() += 1;
        let mut posts = self.posts.lock().unwrap();
        match posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.likes += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        Ok(self.admins.lock().unwrap().iter().find(|a| a.email == email).cloned())
    }
    async fn create_admin(&self, username: &str, email: &str, password_hash: &str) -> Result<Admin, sqlx::Error> {
        let mut admins = self.admins.lock().unwrap();
        let admin = Admin {
            id: admins.len() as i64 + 1,
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
        };
        admins.push(admin.clone());
        Ok(admin)
    }
}

// --- Helpers ---

fn state_with(repo: Arc<MockRepoControl>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}

fn sample_post(id: i64, title: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        content: "Plenty of content for a sample post.".to_string(),
        created_at: Utc::now().naive_utc(),
        likes: 0,
        author_id: Some(1),
    }
}

fn alice_context() -> AuthContext {
    AuthContext::Authenticated {
        id: 1,
        username: "alice".to_string(),
    }
}

fn alice_session() -> AdminSession {
    AdminSession {
        id: 1,
        username: "alice".to_string(),
    }
}

fn post_form(title: &str, content: &str) -> Form<PostForm> {
    Form(PostForm {
        title: title.to_string(),
        content: content.to_string(),
    })
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

// --- Public Page Tests ---

#[tokio::test]
async fn test_list_posts_escapes_titles() {
    let repo = Arc::new(MockRepoControl::with_posts(vec![sample_post(1, "Tom <b>and</b> Jerry")]));

    let response = handlers::list_posts(AuthContext::Anonymous, State(state_with(repo)))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Tom &lt;b&gt;and&lt;/b&gt; Jerry"));
    assert!(body.contains("href=\"/login\""));
}

#[tokio::test]
async fn test_view_post_renders_markdown_and_author() {
    let mut post = sample_post(1, "Markdown");
    post.content = "# Heading\n\nSome **bold** text here.".to_string();
    let repo = Arc::new(MockRepoControl::with_posts(vec![post]));

    let response = handlers::view_post(alice_context(), State(state_with(repo)), PostId::from(1))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<h1>Heading</h1>"));
    assert!(body.contains("<strong>bold</strong>"));
    assert!(body.contains("by alice"));
    assert!(body.contains("action=\"/posts/1/like\""));
}

#[tokio::test]
async fn test_view_post_not_found() {
    let repo = Arc::new(MockRepoControl::default());

    let response = handlers::view_post(AuthContext::Anonymous, State(state_with(repo)), PostId::from(42))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Post not found");
}

// --- Like Tests ---

#[tokio::test]
async fn test_like_requires_authentication() {
    let repo = Arc::new(MockRepoControl::with_posts(vec![sample_post(1, "Liked")]));

    let response = handlers::like_post(AuthContext::Anonymous, State(state_with(repo.clone())), PostId::from(1))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Unauthorized");
    assert_eq!(*repo.like_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_like_increments_and_redirects_home() {
    let repo = Arc::new(MockRepoControl::with_posts(vec![sample_post(1, "Liked")]));

    for _ in 0..2 {
        let response = handlers::like_post(alice_context(), State(state_with(repo.clone())), PostId::from(1))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    assert_eq!(repo.posts.lock().unwrap()[0].likes, 2);
}

#[tokio::test]
async fn test_like_missing_post_is_not_found() {
    let repo = Arc::new(MockRepoControl::default());

    let response = handlers::like_post(alice_context(), State(state_with(repo)), PostId::from(9))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- Account Tests ---

#[tokio::test]
async fn test_register_success_sets_cookie_and_redirects_to_login() {
    let repo = Arc::new(MockRepoControl::default());
    let form = RegisterForm {
        username: "  alice ".to_string(),
        email: " alice@example.com ".to_string(),
        password: "correct horse battery".to_string(),
    };

    let response = handlers::register(
        AuthContext::Anonymous,
        State(state_with(repo.clone())),
        CookieJar::new(),
        Form(form),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let admins = repo.admins.lock().unwrap();
    assert_eq!(admins[0].username, "alice");
    assert_eq!(admins[0].email, "alice@example.com");
    assert!(admins[0].password.starts_with("$2"));
    assert_ne!(admins[0].password, "correct horse battery");
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let repo = Arc::new(MockRepoControl::default());
    repo.create_admin("alice", "alice@example.com", "hash").await.unwrap();

    let form = RegisterForm {
        username: "bob".to_string(),
        email: "alice@example.com".to_string(),
        password: "correct horse battery".to_string(),
    };
    let response = handlers::register(
        AuthContext::Anonymous,
        State(state_with(repo.clone())),
        CookieJar::new(),
        Form(form),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Email already in use"));
    assert_eq!(repo.admins.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let repo = Arc::new(MockRepoControl::default());
    let hash = credentials::hash_password("correct horse battery", 4).await.unwrap();
    repo.create_admin("alice", "alice@example.com", &hash).await.unwrap();

    for (email, password) in [
        ("nobody@example.com", "correct horse battery"),
        ("alice@example.com", "wrong password"),
    ] {
        let form = LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = handlers::login(
            AuthContext::Anonymous,
            State(state_with(repo.clone())),
            CookieJar::new(),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(response).await.contains("Invalid email or password"));
    }
}

#[tokio::test]
async fn test_login_success_redirects_to_dashboard() {
    let repo = Arc::new(MockRepoControl::default());
    let hash = credentials::hash_password("correct horse battery", 4).await.unwrap();
    repo.create_admin("alice", "alice@example.com", &hash).await.unwrap();

    let form = LoginForm {
        email: "alice@example.com".to_string(),
        password: "correct horse battery".to_string(),
    };
    let response = handlers::login(
        AuthContext::Anonymous,
        State(state_with(repo)),
        CookieJar::new(),
        Form(form),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");
    assert!(response.headers()[header::SET_COOKIE].to_str().unwrap().starts_with("token="));
}

// --- Admin Tests ---

#[tokio::test]
async fn test_dashboard_lists_only_own_posts() {
    let mut foreign = sample_post(2, "Someone else");
    foreign.author_id = Some(99);
    let repo = Arc::new(MockRepoControl::with_posts(vec![sample_post(1, "Mine"), foreign]));

    let response = handlers::dashboard(alice_context(), alice_session(), State(state_with(repo)))
        .await
        .into_response();

    let body = body_text(response).await;
    assert!(body.contains("Welcome, alice"));
    assert!(body.contains("Mine"));
    assert!(!body.contains("Someone else"));
}

#[tokio::test]
async fn test_create_post_strips_markup() {
    let repo = Arc::new(MockRepoControl::default());

    let response = handlers::create_post(
        alice_context(),
        alice_session(),
        State(state_with(repo.clone())),
        post_form("  <b>Hello</b> world ", "<script>alert(1)</script>Body text"),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let posts = repo.posts.lock().unwrap();
    assert_eq!(posts[0].title, "Hello world");
    assert_eq!(posts[0].content, "Body text");
    assert_eq!(posts[0].author_id, Some(1));
}

#[tokio::test]
async fn test_create_post_markup_only_title_is_empty() {
    let repo = Arc::new(MockRepoControl::default());

    let response = handlers::create_post(
        alice_context(),
        alice_session(),
        State(state_with(repo.clone())),
        post_form("<script>x</script>", "Some content"),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Title cannot be empty."));
    assert!(repo.posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_page_missing_post() {
    let repo = Arc::new(MockRepoControl::default());

    let response = handlers::edit_post_page(alice_context(), alice_session(), State(state_with(repo)), PostId::from(5))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_post_validation_failure_shows_stored_post() {
    let repo = Arc::new(MockRepoControl::with_posts(vec![sample_post(1, "Original title")]));

    let response = handlers::update_post(
        alice_context(),
        alice_session(),
        State(state_with(repo.clone())),
        PostId::from(1),
        post_form("New title", "too short"),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Content must be at least 20 characters long"));
    assert!(body.contains("value=\"Original title\""));
    assert_eq!(repo.posts.lock().unwrap()[0].title, "Original title");
}

#[tokio::test]
async fn test_update_post_validation_failure_on_missing_post() {
    let repo = Arc::new(MockRepoControl::default());

    let response = handlers::update_post(
        alice_context(),
        alice_session(),
        State(state_with(repo)),
        PostId::from(3),
        post_form("", ""),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_post_success_redirects_home() {
    let repo = Arc::new(MockRepoControl::with_posts(vec![sample_post(1, "Original title")]));

    let response = handlers::update_post(
        alice_context(),
        alice_session(),
        State(state_with(repo.clone())),
        PostId::from(1),
        post_form("Edited <i>title</i>", "Edited content that is long enough."),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(repo.posts.lock().unwrap()[0].title, "Edited title");
}

#[tokio::test]
async fn test_delete_redirects_even_when_missing() {
    let repo = Arc::new(MockRepoControl::with_posts(vec![sample_post(1, "Doomed")]));

    for id in [1, 1, 404] {
        let response = handlers::delete_post(alice_session(), State(state_with(repo.clone())), PostId::from(id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin");
    }

    assert!(repo.posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unparseable_id_behaves_like_missing_post() {
    let repo = Arc::new(MockRepoControl::with_posts(vec![sample_post(1, "Untouched")]));
    let bad_id = PostId(None);

    let response = handlers::like_post(AuthContext::Anonymous, State(state_with(repo.clone())), bad_id)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = handlers::like_post(alice_context(), State(state_with(repo.clone())), bad_id)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(*repo.like_calls.lock().unwrap(), 0);

    let response = handlers::view_post(alice_context(), State(state_with(repo.clone())), bad_id)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = handlers::edit_post_page(alice_context(), alice_session(), State(state_with(repo.clone())), bad_id)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = handlers::update_post(
        alice_context(),
        alice_session(),
        State(state_with(repo.clone())),
        bad_id,
        post_form("Valid title", "Valid content that is long enough."),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = handlers::delete_post(alice_session(), State(state_with(repo.clone())), bad_id)
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let posts = repo.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Untouched");
    assert_eq!(posts[0].likes, 0);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("token=some.jwt.value"));

    let response = handlers::logout(CookieJar::from_headers(&headers))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("Max-Age=0"));
}
