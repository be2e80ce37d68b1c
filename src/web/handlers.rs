use std::sync::Arc;

use tracing::{debug, info};

use super::auth::Authenticated;
use super::forms::{
    AccountPasswordUpdateForm, FormError, SnippetCreateForm, UserLoginForm, UserSignupForm,
};
use super::helpers::{client_error, render, server_error, session, template_data, FLASH};
use super::templates;
use super::App;
use crate::middleware::AUTHENTICATED_USER_ID;
use crate::models::ModelError;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

fn bad_form(req: &Request, err: FormError) -> Response {
    debug!(uri = %req.uri(), error = %err, "undecodable form");
    client_error(Status::BadRequest)
}

pub(crate) async fn home(app: Arc<App>, req: Request) -> Response {
    match app.snippets.latest() {
        Ok(snippets) => render(Status::Ok, templates::home(&template_data(&req), &snippets)),
        Err(e) => server_error(&req, &e),
    }
}

pub(crate) async fn about(_app: Arc<App>, req: Request) -> Response {
    render(Status::Ok, templates::about(&template_data(&req)))
}

pub(crate) async fn snippet_view(app: Arc<App>, req: Request) -> Response {
    let Some(id) = req.param("id").and_then(|id| id.parse::<i64>().ok()).filter(|id| *id >= 1)
    else {
        return client_error(Status::NotFound);
    };
    match app.snippets.get(id) {
        Ok(snippet) => render(Status::Ok, templates::snippet_view(&template_data(&req), &snippet)),
        Err(ModelError::NoRecord) => client_error(Status::NotFound),
        Err(e) => server_error(&req, &e),
    }
}

pub(crate) async fn snippet_create(_app: Arc<App>, req: Request) -> Response {
    let form = SnippetCreateForm::blank();
    render(Status::Ok, templates::snippet_create(&template_data(&req), &form))
}

pub(crate) async fn snippet_create_post(app: Arc<App>, req: Request) -> Response {
    let mut form = match SnippetCreateForm::parse(&req) {
        Ok(form) => form,
        Err(e) => return bad_form(&req, e),
    };
    form.validate();
    if !form.validator.valid() {
        let page = templates::snippet_create(&template_data(&req), &form);
        return render(Status::UnprocessableContent, page);
    }

    let id = match app.snippets.insert(&form.title, &form.content, form.expires) {
        Ok(id) => id,
        Err(e) => return server_error(&req, &e),
    };
    let session = match session(&req) {
        Ok(s) => s,
        Err(res) => return res,
    };
    session.put(FLASH, "Snippet successfully created!");
    Response::redirect(&format!("/snippet/view/{id}"))
}

pub(crate) async fn user_signup(_app: Arc<App>, req: Request) -> Response {
    render(Status::Ok, templates::signup(&template_data(&req), &UserSignupForm::default()))
}

pub(crate) async fn user_signup_post(app: Arc<App>, req: Request) -> Response {
    let mut form = match UserSignupForm::parse(&req) {
        Ok(form) => form,
        Err(e) => return bad_form(&req, e),
    };
    form.validate();
    if !form.validator.valid() {
        let page = templates::signup(&template_data(&req), &form);
        return render(Status::UnprocessableContent, page);
    }

    match app.users.insert(&form.name, &form.email, &form.password).await {
        Ok(id) => info!(user = id, "user signed up"),
        Err(ModelError::DuplicateEmail) => {
            form.validator.add_field_error("email", "Email address is already in use");
            let page = templates::signup(&template_data(&req), &form);
            return render(Status::UnprocessableContent, page);
        }
        Err(e) => return server_error(&req, &e),
    }

    let session = match session(&req) {
        Ok(s) => s,
        Err(res) => return res,
    };
    session.put(FLASH, "Your signup was successful. Please log in.");
    Response::redirect("/user/login")
}

pub(crate) async fn user_login(_app: Arc<App>, req: Request) -> Response {
    render(Status::Ok, templates::login(&template_data(&req), &UserLoginForm::default()))
}

pub(crate) async fn user_login_post(app: Arc<App>, req: Request) -> Response {
    let mut form = match UserLoginForm::parse(&req) {
        Ok(form) => form,
        Err(e) => return bad_form(&req, e),
    };
    form.validate();
    if !form.validator.valid() {
        let page = templates::login(&template_data(&req), &form);
        return render(Status::UnprocessableContent, page);
    }

    let id = match app.users.authenticate(&form.email, &form.password).await {
        Ok(id) => id,
        Err(ModelError::InvalidCredentials) => {
            form.validator.add_non_field_error("Email or password is incorrect");
            let page = templates::login(&template_data(&req), &form);
            return render(Status::UnprocessableContent, page);
        }
        Err(e) => return server_error(&req, &e),
    };

    let session = match session(&req) {
        Ok(s) => s,
        Err(res) => return res,
    };
    // New privilege level, new token.
    session.renew_token();
    session.put(AUTHENTICATED_USER_ID, id);
    info!(user = id, "user logged in");
    Response::redirect("/snippet/create")
}

pub(crate) async fn user_logout_post(_app: Arc<App>, req: Request) -> Response {
    let session = match session(&req) {
        Ok(s) => s,
        Err(res) => return res,
    };
    session.renew_token();
    session.remove(AUTHENTICATED_USER_ID);
    session.put(FLASH, "You've been logged out successfully!");
    Response::redirect("/")
}

pub(crate) async fn account_view(app: Arc<App>, req: Request) -> Response {
    let Some(Authenticated(id)) = req.extensions().get::<Authenticated>().copied() else {
        return Response::redirect("/user/login");
    };
    match app.users.get(id) {
        Ok(user) => render(Status::Ok, templates::account_view(&template_data(&req), &user)),
        Err(ModelError::NoRecord) => Response::redirect("/user/login"),
        Err(e) => server_error(&req, &e),
    }
}

pub(crate) async fn account_password_update(_app: Arc<App>, req: Request) -> Response {
    let form = AccountPasswordUpdateForm::default();
    render(Status::Ok, templates::password_update(&template_data(&req), &form))
}

pub(crate) async fn account_password_update_post(app: Arc<App>, req: Request) -> Response {
    let mut form = match AccountPasswordUpdateForm::parse(&req) {
        Ok(form) => form,
        Err(e) => return bad_form(&req, e),
    };
    form.validate();
    if !form.validator.valid() {
        let page = templates::password_update(&template_data(&req), &form);
        return render(Status::UnprocessableContent, page);
    }

    let Some(Authenticated(id)) = req.extensions().get::<Authenticated>().copied() else {
        return Response::redirect("/user/login");
    };
    match app
        .users
        .update_password(id, &form.current_password, &form.new_password)
        .await
    {
        Ok(()) => {}
        Err(ModelError::InvalidCredentials) => {
            form.validator.add_field_error("currentPassword", "Current password is incorrect");
            let page = templates::password_update(&template_data(&req), &form);
            return render(Status::UnprocessableContent, page);
        }
        Err(ModelError::NoRecord) => return Response::redirect("/user/login"),
        Err(e) => return server_error(&req, &e),
    }

    let session = match session(&req) {
        Ok(s) => s,
        Err(res) => return res,
    };
    session.put(FLASH, "Your password has been updated!");
    Response::redirect("/account/view")
}
