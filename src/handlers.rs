use crate::{
    AppState,
    auth::{self, AdminSession, AuthContext},
    credentials,
    error::{AppError, AppResult},
    markdown,
    models::{LoginForm, Post, PostForm, PostId, RegisterForm},
    sanitize::strip_markup,
    validation,
    views::{
        CreatePostView, DashboardView, EditPostView, HomeView, LoginView, Page, PostView,
        RegisterView,
    },
};
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

const INVALID_LOGIN: &str = "Invalid email or password";

/// Trims and strips markup from both fields of a post form.
fn clean_post_form(form: PostForm) -> PostForm {
    PostForm {
        title: strip_markup(form.title.trim()),
        content: strip_markup(form.content.trim()),
    }
}

/// Fetches a post for the edit form; an unparseable or unknown id is a 404.
async fn load_post(state: &AppState, id: PostId) -> AppResult<Post> {
    let id = id.get().ok_or_else(AppError::post_not_found)?;
    state
        .repo
        .get_post(id)
        .await?
        .ok_or_else(AppError::post_not_found)
}

// --- Public Handlers ---

/// list_posts
///
/// [Public Route] Every post, newest first. No pagination.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Home page listing every post"))
)]
pub async fn list_posts(auth: AuthContext, State(state): State<AppState>) -> AppResult<Response> {
    let posts = state.repo.list_posts().await?;
    Ok(Page(HomeView { auth, posts }).into_response())
}

/// view_post
///
/// [Public Route] A single post with its author, content rendered from markdown.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post page"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn view_post(
    auth: AuthContext,
    State(state): State<AppState>,
    id: PostId,
) -> AppResult<Response> {
    let Some(id) = id.get() else {
        return Err(AppError::post_not_found());
    };
    let post = state
        .repo
        .get_post_detail(id)
        .await?
        .ok_or_else(AppError::post_not_found)?;

    let rendered_content = markdown::render(&post.post.content);
    Ok(Page(PostView {
        auth,
        post,
        rendered_content,
    })
    .into_response())
}

/// like_post
///
/// [Public Route, authentication checked here] Any logged-in admin may like any
/// post, as often as they like. Anonymous callers get a 401, not a redirect.
#[utoipa::path(
    post,
    path = "/posts/{id}/like",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 303, description = "Liked, redirect to /"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn like_post(
    auth: AuthContext,
    State(state): State<AppState>,
    id: PostId,
) -> AppResult<Redirect> {
    if !auth.is_authenticated() {
        return Err(AppError::Unauthorized("Unauthorized"));
    }

    let Some(id) = id.get() else {
        return Err(AppError::post_not_found());
    };
    if !state.repo.like_post(id).await? {
        return Err(AppError::post_not_found());
    }

    Ok(Redirect::to("/"))
}

/// login_page
///
/// [Public Route] Empty login form.
#[utoipa::path(get, path = "/login", responses((status = 200, description = "HTML page")))]
pub async fn login_page(auth: AuthContext) -> Page<LoginView> {
    Page(LoginView {
        auth,
        errors: vec![],
    })
}

/// register_page
///
/// [Public Route] Empty registration form.
#[utoipa::path(get, path = "/register", responses((status = 200, description = "HTML page")))]
pub async fn register_page(auth: AuthContext) -> Page<RegisterView> {
    Page(RegisterView {
        auth,
        errors: vec![],
    })
}

/// register
///
/// [Public Route] Creates an admin account.
///
/// *Flow*: validate (including the email-in-use check), hash the password, insert,
/// set the identity cookie, then send the browser to the login page. The new admin
/// still has to log in even though a valid cookie was just issued.
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with errors"),
        (status = 303, description = "Registered, redirect to /login")
    )
)]
pub async fn register(
    auth: AuthContext,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let form = RegisterForm {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password,
    };

    let mut errors = validation::validate_registration(&form);
    if state.repo.find_admin_by_email(&form.email).await?.is_some() {
        errors.push("Email already in use".to_string());
    }

    if !errors.is_empty() {
        return Ok(Page(RegisterView { auth, errors }).into_response());
    }

    let password_hash = credentials::hash_password(&form.password, state.config.bcrypt_cost).await?;
    let admin = state
        .repo
        .create_admin(&form.username, &form.email, &password_hash)
        .await?;
    tracing::info!(admin_id = admin.id, username = %admin.username, "admin registered");

    let token = auth::issue_token(
        admin.id,
        &admin.username,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )?;
    let jar = jar.add(auth::token_cookie(token, &state.config));

    Ok((jar, Redirect::to("/login")).into_response())
}

/// login
///
/// [Public Route] Authenticates an admin and sets the identity cookie.
///
/// *Security*: an unknown email and a wrong password produce the same message.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with errors"),
        (status = 303, description = "Logged in, redirect to /admin")
    )
)]
pub async fn login(
    auth: AuthContext,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let form = LoginForm {
        email: form.email.trim().to_string(),
        password: form.password,
    };

    let errors = validation::validate_login(&form);
    if !errors.is_empty() {
        return Ok(Page(LoginView { auth, errors }).into_response());
    }

    let admin = match state.repo.find_admin_by_email(&form.email).await? {
        Some(admin) if credentials::verify_password(&form.password, &admin.password).await? => admin,
        _ => {
            tracing::warn!("failed login attempt");
            let errors = vec![INVALID_LOGIN.to_string()];
            return Ok(Page(LoginView { auth, errors }).into_response());
        }
    };

    let token = auth::issue_token(
        admin.id,
        &admin.username,
        &state.config.jwt_secret,
        state.config.token_ttl_hours,
    )?;
    tracing::info!(admin_id = admin.id, "admin logged in");

    let jar = jar.add(auth::token_cookie(token, &state.config));
    Ok((jar, Redirect::to("/admin")).into_response())
}

/// logout
///
/// [Public Route] Clears the identity cookie. The token itself stays valid until
/// it expires.
#[utoipa::path(get, path = "/logout", responses((status = 303, description = "Redirect to /")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(auth::removal_cookie()), Redirect::to("/"))
}

// --- Admin Handlers (behind `require_admin`) ---

/// dashboard
///
/// [Admin Route] Posts written by the logged-in admin.
#[utoipa::path(get, path = "/admin", responses((status = 200, description = "HTML page")))]
pub async fn dashboard(
    auth: AuthContext,
    admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let posts = state.repo.list_posts_by_author(admin.id).await?;
    Ok(Page(DashboardView { auth, admin, posts }).into_response())
}

/// new_post_page
///
/// [Admin Route] Empty create form.
#[utoipa::path(get, path = "/admin/posts/new", responses((status = 200, description = "HTML page")))]
pub async fn new_post_page(auth: AuthContext, _admin: AdminSession) -> Page<CreatePostView> {
    Page(CreatePostView {
        auth,
        errors: vec![],
    })
}

/// create_post
///
/// [Admin Route] Sanitizes, validates and inserts a post owned by the current admin.
/// Validation runs on the sanitized text, so markup-only input counts as empty.
#[utoipa::path(
    post,
    path = "/admin/create-post",
    request_body(content = PostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with errors"),
        (status = 303, description = "Created, redirect to /admin")
    )
)]
pub async fn create_post(
    auth: AuthContext,
    admin: AdminSession,
    State(state): State<AppState>,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let form = clean_post_form(form);

    let errors = validation::validate_new_post(&form);
    if !errors.is_empty() {
        return Ok(Page(CreatePostView { auth, errors }).into_response());
    }

    let post = state
        .repo
        .create_post(&form.title, &form.content, admin.id)
        .await?;
    tracing::info!(post_id = post.id, author_id = admin.id, "post created");

    Ok(Redirect::to("/admin").into_response())
}

/// edit_post_page
///
/// [Admin Route] Edit form pre-filled with the stored post.
#[utoipa::path(
    get,
    path = "/admin/posts/{id}/edit",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Edit form"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn edit_post_page(
    auth: AuthContext,
    _admin: AdminSession,
    State(state): State<AppState>,
    id: PostId,
) -> AppResult<Response> {
    let post = load_post(&state, id).await?;

    Ok(Page(EditPostView {
        auth,
        post,
        errors: vec![],
    })
    .into_response())
}

/// update_post
///
/// [Admin Route] Replaces title and content. Any admin may edit any post.
///
/// On validation failure the stored post is reloaded so the form is not blank.
/// Updating an id with no row is a silent no-op.
#[utoipa::path(
    post,
    path = "/admin/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body(content = PostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with errors"),
        (status = 303, description = "Updated, redirect to /"),
        (status = 404, description = "Validation failed and the post no longer exists")
    )
)]
pub async fn update_post(
    auth: AuthContext,
    admin: AdminSession,
    State(state): State<AppState>,
    id: PostId,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let form = clean_post_form(form);

    let errors = validation::validate_post_edit(&form);
    if !errors.is_empty() {
        let post = load_post(&state, id).await?;
        return Ok(Page(EditPostView { auth, post, errors }).into_response());
    }

    let updated = match id.get() {
        Some(id) => state.repo.update_post(id, &form.title, &form.content).await?,
        None => false,
    };
    tracing::info!(post_id = ?id.get(), admin_id = admin.id, updated, "post update");

    Ok(Redirect::to("/").into_response())
}

/// delete_post
///
/// [Admin Route] Deletes by id without an existence or ownership check; the
/// redirect is the same whether or not a row was removed.
#[utoipa::path(
    post,
    path = "/admin/posts/{id}/delete",
    params(("id" = i64, Path, description = "Post ID")),
    responses((status = 303, description = "Redirect to /admin"))
)]
pub async fn delete_post(
    admin: AdminSession,
    State(state): State<AppState>,
    id: PostId,
) -> AppResult<Redirect> {
    let deleted = match id.get() {
        Some(id) => state.repo.delete_post(id).await?,
        None => false,
    };
    tracing::info!(post_id = ?id.get(), admin_id = admin.id, deleted, "post delete");

    Ok(Redirect::to("/admin"))
}
