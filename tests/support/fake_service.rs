//! In-process stand-in for the admin user-management service.
//!
//! Behaves like the real routes by default; [`Behavior`] switches individual
//! rules off so tests can watch the probes catch the regression.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADMIN_PHONE: &str = "+919999999999";
const VALID_ROLES: [&str; 3] = ["customer", "spa_owner", "admin"];

#[derive(Debug, Clone)]
pub struct Behavior {
    /// Put the OTP in the send-otp response
    pub echo_otp: bool,
    /// Issue this OTP instead of a generated one
    pub fixed_otp: Option<String>,
    /// Role of the seeded admin account
    pub admin_role: String,
    /// Create users even when the phone is taken
    pub accept_duplicates: bool,
    /// Return 403 for authenticated non-admins
    pub enforce_roles: bool,
    /// Delay before answering the user listing
    pub list_delay: Option<Duration>,
    /// Answer the listing without a session instead of 401
    pub open_listing: bool,
    /// Return an empty user list
    pub empty_listing: bool,
    /// Leave the admin out of the user list
    pub hide_admin: bool,
    /// Drop `createdAt` from listed users
    pub omit_created_at: bool,
    /// Leave `id` out of the created-user record
    pub omit_created_id: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            echo_otp: true,
            fixed_otp: None,
            admin_role: "admin".to_string(),
            accept_duplicates: false,
            enforce_roles: true,
            list_delay: None,
            open_listing: false,
            empty_listing: false,
            hide_admin: false,
            omit_created_at: false,
            omit_created_id: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub created_at: String,
}

impl FakeUser {
    fn public(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "phone": self.phone,
            "role": self.role,
        })
    }
}

struct ServiceState {
    behavior: Behavior,
    users: Vec<FakeUser>,
    otps: HashMap<String, String>,
    sessions: HashMap<String, String>,
    next_id: u64,
}

impl ServiceState {
    fn insert_user(&mut self, name: &str, phone: &str, role: &str) -> FakeUser {
        self.next_id += 1;
        let user = FakeUser {
            id: format!("{:024x}", self.next_id),
            name: name.to_string(),
            phone: phone.to_string(),
            role: role.to_string(),
            created_at: format!("2024-01-01T00:00:{:02}.000Z", self.next_id % 60),
        };
        self.users.push(user.clone());
        user
    }

    fn user_for_request(&self, headers: &HeaderMap) -> Option<&FakeUser> {
        let token = headers
            .get(header::COOKIE)?
            .to_str()
            .ok()?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == "token")
            .map(|(_, value)| value.to_string())?;
        let user_id = self.sessions.get(&token)?;
        self.users.iter().find(|u| &u.id == user_id)
    }
}

type Shared = Arc<Mutex<ServiceState>>;

pub struct FakeService {
    pub base_url: String,
    state: Shared,
}

impl FakeService {
    pub async fn spawn(behavior: Behavior) -> Self {
        let mut inner = ServiceState {
            behavior: behavior.clone(),
            users: Vec::new(),
            otps: HashMap::new(),
            sessions: HashMap::new(),
            next_id: 0,
        };
        inner.insert_user("Dipak Parmar", ADMIN_PHONE, &behavior.admin_role);
        let state = Arc::new(Mutex::new(inner));

        let app = Router::new()
            .route("/api/auth/send-otp", post(send_otp))
            .route("/api/auth/verify-otp", post(verify_otp))
            .route("/api/admin/users", get(list_users).post(create_user))
            .route("/api/admin/users/update-role", post(update_role))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn user_by_phone(&self, phone: &str) -> Option<FakeUser> {
        let state = self.state.lock().unwrap();
        state.users.iter().find(|u| u.phone == phone).cloned()
    }

    pub fn users_with_phone(&self, phone: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.users.iter().filter(|u| u.phone == phone).count()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn field<'a>(body: &'a Value, name: &str) -> Option<&'a str> {
    body.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// 401 without a session, 403 for non-admins (when enforced).
fn authorize(state: &ServiceState, headers: &HeaderMap) -> Result<(), Response> {
    let user = state
        .user_for_request(headers)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    if state.behavior.enforce_roles && user.role != "admin" {
        return Err(error(
            StatusCode::FORBIDDEN,
            "Unauthorized - Admin access required",
        ));
    }
    Ok(())
}

async fn send_otp(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let (Some(phone), Some(_name)) = (field(&body, "phone"), field(&body, "name")) else {
        return error(StatusCode::BAD_REQUEST, "Phone and name are required");
    };

    let mut state = state.lock().unwrap();
    let otp = state
        .behavior
        .fixed_otp
        .clone()
        .unwrap_or_else(|| format!("{:06}", 100_000 + state.otps.len() * 7919 % 900_000));
    state.otps.insert(phone.to_string(), otp.clone());

    let mut response = json!({
        "success": true,
        "message": "We are in development mode so we can afford OTP cost",
    });
    if state.behavior.echo_otp {
        response["otp"] = Value::String(otp);
    }
    Json(response).into_response()
}

async fn verify_otp(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let (Some(phone), Some(otp)) = (field(&body, "phone"), field(&body, "otp")) else {
        return error(StatusCode::BAD_REQUEST, "Phone and OTP are required");
    };
    let name = field(&body, "name").unwrap_or("User");

    let mut state = state.lock().unwrap();
    if state.otps.get(phone).map(String::as_str) != Some(otp) {
        return error(StatusCode::BAD_REQUEST, "Invalid or expired OTP");
    }

    let existing = state.users.iter().find(|u| u.phone == phone).cloned();
    let user = match existing {
        Some(user) => user,
        None => state.insert_user(name, phone, "customer"),
    };

    let token = format!("tok-{}", user.id);
    state.sessions.insert(token.clone(), user.id.clone());

    let cookie = format!(
        "token={}; Path=/; Max-Age=604800; HttpOnly; SameSite=lax",
        token
    );
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "success": true,
            "message": "Login successful",
            "user": user.public(),
            "token": token,
        })),
    )
        .into_response()
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let delay = state.lock().unwrap().behavior.list_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let state = state.lock().unwrap();
    if let Err(rejection) = authorize(&state, &headers) {
        let anonymous = state.user_for_request(&headers).is_none();
        if !(state.behavior.open_listing && anonymous) {
            return rejection;
        }
    }

    let behavior = &state.behavior;
    let users: Vec<Value> = state
        .users
        .iter()
        .rev()
        .filter(|_| !behavior.empty_listing)
        .filter(|u| !(behavior.hide_admin && u.phone == ADMIN_PHONE))
        .map(|u| {
            let mut entry = json!({
                "_id": u.id,
                "name": u.name,
                "phone": u.phone,
                "role": u.role,
                "createdAt": u.created_at,
            });
            if behavior.omit_created_at {
                if let Some(object) = entry.as_object_mut() {
                    object.remove("createdAt");
                }
            }
            entry
        })
        .collect();
    Json(json!({ "users": users })).into_response()
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    let (Some(name), Some(phone), Some(role)) = (
        field(&body, "name"),
        field(&body, "phone"),
        field(&body, "role"),
    ) else {
        return error(StatusCode::BAD_REQUEST, "Name, phone, and role are required");
    };
    if !VALID_ROLES.contains(&role) {
        return error(StatusCode::BAD_REQUEST, "Invalid role");
    }
    if !state.behavior.accept_duplicates && state.users.iter().any(|u| u.phone == phone) {
        return error(
            StatusCode::BAD_REQUEST,
            "User with this phone number already exists",
        );
    }

    let user = state.insert_user(name, phone, role);
    let mut record = user.public();
    if state.behavior.omit_created_id {
        if let Some(object) = record.as_object_mut() {
            object.remove("id");
        }
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User created successfully",
            "user": record,
        })),
    )
        .into_response()
}

async fn update_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    let (Some(user_id), Some(new_role)) = (field(&body, "userId"), field(&body, "newRole")) else {
        return error(StatusCode::BAD_REQUEST, "User ID and new role are required");
    };
    if !VALID_ROLES.contains(&new_role) {
        return error(StatusCode::BAD_REQUEST, "Invalid role");
    }

    let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    let old_role = std::mem::replace(&mut user.role, new_role.to_string());

    Json(json!({
        "success": true,
        "message": format!("User role updated from {} to {}", old_role, new_role),
        "user": user.public(),
    }))
    .into_response()
}
