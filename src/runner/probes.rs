//! The fixed script of API probes.
//!
//! Each probe gets the client, the config and the run context explicitly;
//! whatever it learns that later probes need goes into the context.

use serde_json::{json, Map, Value};

use super::assertions::{expect_rejection, expect_status, missing_fields};
use super::context::RunContext;
use crate::api::client::{ADMIN_USERS_PATH, SESSION_COOKIE, UPDATE_ROLE_PATH};
use crate::api::types::{SendOtpResponse, UserMutationResponse, VerifyOtpResponse};
use crate::api::{AdminApiClient, ApiResponse, Role, Session};
use crate::error::{ProbeError, ProbeResult};
use crate::utils::config::Config;

/// Well-formed object id that no user has.
pub const UNKNOWN_USER_ID: &str = "507f1f77bcf86cd799439011";

/// Role value outside the recognized set.
pub const INVALID_ROLE: &str = "invalid_role";

/// Fields every listed user must carry.
pub const REQUIRED_USER_FIELDS: [&str; 4] = ["name", "phone", "role", "createdAt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SendOtp,
    AdminLogin,
    ListUsers,
    ListUsersUnauthorized,
    CreateUser,
    CreateDuplicateUser,
    CreateUserInvalidRole,
    CreateUserMissingFields,
    UpdateRole,
    UpdateRoleUnknownUser,
    UpdateRoleInvalidRole,
    UpdateRoleMissingParams,
    NonAdminAccess,
}

impl Step {
    /// Execution order.
    pub const ALL: [Step; 13] = [
        Step::SendOtp,
        Step::AdminLogin,
        Step::ListUsers,
        Step::ListUsersUnauthorized,
        Step::CreateUser,
        Step::CreateDuplicateUser,
        Step::CreateUserInvalidRole,
        Step::CreateUserMissingFields,
        Step::UpdateRole,
        Step::UpdateRoleUnknownUser,
        Step::UpdateRoleInvalidRole,
        Step::UpdateRoleMissingParams,
        Step::NonAdminAccess,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::SendOtp => "Send OTP",
            Step::AdminLogin => "Admin Login",
            Step::ListUsers => "GET /api/admin/users",
            Step::ListUsersUnauthorized => "GET /api/admin/users (Unauthorized)",
            Step::CreateUser => "POST /api/admin/users (Create User)",
            Step::CreateDuplicateUser => "POST /api/admin/users (Duplicate Phone)",
            Step::CreateUserInvalidRole => "POST /api/admin/users (Invalid Role)",
            Step::CreateUserMissingFields => "POST /api/admin/users (Missing Fields)",
            Step::UpdateRole => "POST /api/admin/users/update-role",
            Step::UpdateRoleUnknownUser => "POST /api/admin/users/update-role (Invalid User)",
            Step::UpdateRoleInvalidRole => "POST /api/admin/users/update-role (Invalid Role)",
            Step::UpdateRoleMissingParams => "POST /api/admin/users/update-role (Missing Params)",
            Step::NonAdminAccess => "Non-Admin Access Control",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Step::SendOtp => "request an OTP for the admin phone",
            Step::AdminLogin => "verify the OTP and expect the admin role",
            Step::ListUsers => "list users as admin, expect 200 with the admin present",
            Step::ListUsersUnauthorized => "list users without credentials, expect 401",
            Step::CreateUser => "create a spa_owner with a fresh phone, expect 201",
            Step::CreateDuplicateUser => "re-create the same phone, expect 400 'already exists'",
            Step::CreateUserInvalidRole => "create with an unknown role, expect 400 'invalid role'",
            Step::CreateUserMissingFields => "create without phone/role, expect 400 'required'",
            Step::UpdateRole => "change the created user to customer, expect 200",
            Step::UpdateRoleUnknownUser => "update a non-existent id, expect 404 'not found'",
            Step::UpdateRoleInvalidRole => "update to an unknown role, expect 400 'invalid role'",
            Step::UpdateRoleMissingParams => "update without newRole, expect 400 'required'",
            Step::NonAdminAccess => "log in as a customer, expect 403 on every admin endpoint",
        }
    }

    /// A failed fatal step leaves no session to continue with.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Step::SendOtp | Step::AdminLogin)
    }

    /// Message logged when this fatal step stops the run.
    pub fn abort_reason(&self) -> &'static str {
        match self {
            Step::SendOtp => "Cannot proceed without OTP",
            _ => "Cannot proceed without admin authentication",
        }
    }
}

/// What a passing probe reports.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub message: String,
    pub details: Map<String, Value>,
}

impl StepReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

pub async fn run_probe(
    step: Step,
    client: &AdminApiClient,
    config: &Config,
    ctx: &mut RunContext,
) -> ProbeResult<StepReport> {
    match step {
        Step::SendOtp => send_otp(client, config, ctx).await,
        Step::AdminLogin => admin_login(client, config, ctx).await,
        Step::ListUsers => list_users(client, config, ctx).await,
        Step::ListUsersUnauthorized => list_users_unauthorized(client).await,
        Step::CreateUser => create_user(client, ctx).await,
        Step::CreateDuplicateUser => create_duplicate_user(client, ctx).await,
        Step::CreateUserInvalidRole => create_user_invalid_role(client, ctx).await,
        Step::CreateUserMissingFields => create_user_missing_fields(client, ctx).await,
        Step::UpdateRole => update_role(client, ctx).await,
        Step::UpdateRoleUnknownUser => update_role_unknown_user(client, ctx).await,
        Step::UpdateRoleInvalidRole => update_role_invalid_role(client, ctx).await,
        Step::UpdateRoleMissingParams => update_role_missing_params(client, ctx).await,
        Step::NonAdminAccess => non_admin_access(client, config, ctx).await,
    }
}

fn rejection_report(message: &str, response: &ApiResponse, error: String) -> StepReport {
    StepReport::new(message)
        .detail("status_code", response.status)
        .detail("error_message", error)
}

/// The OTP from a send-otp response, falling back to the configured one.
fn issued_otp(body: &SendOtpResponse, config: &Config) -> Option<String> {
    body.otp.clone().or_else(|| config.otp.clone())
}

async fn send_otp(client: &AdminApiClient, config: &Config, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let response = client.send_otp(&config.admin_phone, &config.admin_name).await?;
    expect_status(&response, 200)?;

    let body: SendOtpResponse = response.json()?;
    if !body.success {
        return Err(ProbeError::assertion(format!(
            "Failed to send OTP: {}",
            body.error.as_deref().unwrap_or("Unknown error")
        )));
    }

    let otp = issued_otp(&body, config).ok_or_else(|| {
        ProbeError::assertion("Service did not echo an OTP and none is configured")
    })?;
    ctx.otp = Some(otp.clone());

    Ok(StepReport::new(format!("OTP sent successfully. OTP: {}", otp))
        .detail("echoed", body.otp.is_some())
        .detail("message", body.message.unwrap_or_default()))
}

async fn admin_login(client: &AdminApiClient, config: &Config, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let otp = ctx
        .otp
        .clone()
        .ok_or_else(|| ProbeError::assertion("No OTP available from previous step"))?;

    let response = client
        .verify_otp(&config.admin_phone, &otp, &config.admin_name)
        .await?;
    expect_status(&response, 200)?;

    let body: VerifyOtpResponse = response.json()?;
    if !body.success {
        return Err(ProbeError::assertion(format!(
            "Login failed: {}",
            body.error.as_deref().unwrap_or("Unknown error")
        )));
    }

    let user = body.user.unwrap_or_default();
    if !user.has_role(Role::Admin) {
        return Err(ProbeError::assertion(format!(
            "User role is {}, expected 'admin'",
            user.role_display()
        )));
    }
    if body.token.is_none() {
        return Err(ProbeError::assertion("Login response carried no token"));
    }
    if response.cookie(SESSION_COOKIE).is_none() {
        return Err(ProbeError::assertion(format!(
            "Login response did not set the '{}' cookie",
            SESSION_COOKIE
        )));
    }

    ctx.admin = Session::from_login(body.token, response.cookies.clone());
    ctx.admin_user_id = user.id.clone();

    Ok(StepReport::new("Admin logged in successfully")
        .detail("user_id", user.id)
        .detail("role", user.role)
        .detail("has_token", ctx.admin.token.is_some())
        .detail("has_cookies", ctx.admin.has_cookies()))
}

async fn list_users(client: &AdminApiClient, config: &Config, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let response = client.list_users(&ctx.admin).await?;
    expect_status(&response, 200)?;

    let body: Value = response.json()?;
    let users = match body.get("users").and_then(Value::as_array) {
        Some(users) if !users.is_empty() => users,
        _ => {
            return Err(ProbeError::assertion(
                "No users returned or invalid response format",
            ))
        }
    };

    let mut admin_found = false;
    for user in users {
        let object = user
            .as_object()
            .ok_or_else(|| ProbeError::assertion("User entry is not a JSON object"))?;

        let missing = missing_fields(object, &REQUIRED_USER_FIELDS);
        if !missing.is_empty() {
            return Err(ProbeError::assertion(format!(
                "Missing fields in user object: {:?}",
                missing
            )));
        }

        if is_admin_entry(object, config, ctx) {
            admin_found = true;
        }
    }

    if !admin_found {
        return Err(ProbeError::assertion("Admin user not found in users list"));
    }

    let sample_fields: Vec<Value> = users[0]
        .as_object()
        .map(|o| o.keys().cloned().map(Value::String).collect())
        .unwrap_or_default();

    Ok(
        StepReport::new(format!("Successfully fetched {} users", users.len()))
            .detail("user_count", users.len())
            .detail("admin_found", true)
            .detail("sample_user_fields", sample_fields),
    )
}

/// A listed user is the admin if either the phone or the id from login matches.
fn is_admin_entry(object: &Map<String, Value>, config: &Config, ctx: &RunContext) -> bool {
    let field = |name: &str| object.get(name).and_then(Value::as_str);
    if field("phone") == Some(config.admin_phone.as_str()) {
        return true;
    }
    match ctx.admin_user_id.as_deref() {
        Some(id) => field("_id") == Some(id) || field("id") == Some(id),
        None => false,
    }
}

async fn list_users_unauthorized(client: &AdminApiClient) -> ProbeResult<StepReport> {
    let response = client.list_users(&Session::anonymous()).await?;
    if response.status != 401 {
        return Err(ProbeError::StatusMismatch {
            expected: 401,
            actual: response.status,
        });
    }

    let error = response.error_message().ok_or_else(|| {
        ProbeError::assertion("401 response carried no error message")
    })?;

    Ok(rejection_report(
        "Correctly returned 401 for unauthenticated request",
        &response,
        error,
    ))
}

async fn create_user(client: &AdminApiClient, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let phone = ctx.phones.next_phone();
    let role = Role::SpaOwner;

    let response = client
        .create_user(&ctx.admin, "Test Spa Owner", &phone, role.as_str())
        .await?;
    expect_status(&response, 201)?;

    let body: UserMutationResponse = response.json()?;
    if !body.success {
        return Err(ProbeError::assertion(format!(
            "Creation failed: {}",
            body.error.as_deref().unwrap_or("Unknown error")
        )));
    }

    let user = body.user.unwrap_or_default();
    if !user.has_role(role) {
        return Err(ProbeError::assertion(format!(
            "Created user has role {}, expected '{}'",
            user.role_display(),
            role
        )));
    }
    let id = user
        .id
        .clone()
        .ok_or_else(|| ProbeError::assertion("Created user record carried no id"))?;

    ctx.created_user_id = Some(id);
    ctx.created_user_phone = Some(phone);

    Ok(StepReport::new("Successfully created spa_owner user")
        .detail("user_id", user.id)
        .detail("name", user.name)
        .detail("phone", user.phone)
        .detail("role", user.role)
        .detail("status_code", response.status))
}

async fn create_duplicate_user(client: &AdminApiClient, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let phone = ctx
        .created_user_phone
        .clone()
        .ok_or(ProbeError::MissingCreatedUser)?;

    let response = client
        .create_user(&ctx.admin, "Duplicate User", &phone, Role::Customer.as_str())
        .await?;
    let error = expect_rejection(&response, 400, "already exists")?;

    Ok(rejection_report(
        "Correctly rejected duplicate phone number",
        &response,
        error,
    ))
}

async fn create_user_invalid_role(client: &AdminApiClient, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let phone = ctx.phones.next_phone();
    let response = client
        .create_user(&ctx.admin, "Invalid Role User", &phone, INVALID_ROLE)
        .await?;
    let error = expect_rejection(&response, 400, "invalid role")?;

    Ok(rejection_report("Correctly rejected invalid role", &response, error))
}

async fn create_user_missing_fields(client: &AdminApiClient, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let response = client
        .post_json(ADMIN_USERS_PATH, &ctx.admin, &json!({ "name": "Incomplete User" }))
        .await?;
    let error = expect_rejection(&response, 400, "required")?;

    Ok(rejection_report(
        "Correctly rejected missing required fields",
        &response,
        error,
    ))
}

async fn update_role(client: &AdminApiClient, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let user_id = ctx
        .created_user_id
        .clone()
        .ok_or(ProbeError::MissingCreatedUser)?;
    let new_role = Role::Customer;

    let response = client
        .update_role(&ctx.admin, &user_id, new_role.as_str())
        .await?;
    expect_status(&response, 200)?;

    let body: UserMutationResponse = response.json()?;
    if !body.success {
        return Err(ProbeError::assertion(format!(
            "Update failed: {}",
            body.error.as_deref().unwrap_or("Unknown error")
        )));
    }

    let user = body.user.unwrap_or_default();
    if !user.has_role(new_role) {
        return Err(ProbeError::assertion(format!(
            "Role not updated correctly: {}",
            user.role_display()
        )));
    }

    Ok(StepReport::new("Successfully updated user role")
        .detail("user_id", user.id)
        .detail("old_role", Role::SpaOwner.as_str())
        .detail("new_role", user.role)
        .detail("message", body.message.unwrap_or_default()))
}

async fn update_role_unknown_user(client: &AdminApiClient, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let response = client
        .update_role(&ctx.admin, UNKNOWN_USER_ID, Role::SpaOwner.as_str())
        .await?;
    let error = expect_rejection(&response, 404, "not found")?;

    Ok(rejection_report(
        "Correctly returned 404 for non-existent user",
        &response,
        error,
    ))
}

async fn update_role_invalid_role(client: &AdminApiClient, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let user_id = ctx
        .created_user_id
        .clone()
        .ok_or(ProbeError::MissingCreatedUser)?;

    let response = client.update_role(&ctx.admin, &user_id, INVALID_ROLE).await?;
    let error = expect_rejection(&response, 400, "invalid role")?;

    Ok(rejection_report("Correctly rejected invalid role", &response, error))
}

async fn update_role_missing_params(client: &AdminApiClient, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    // validation has to fire before any lookup, so any id will do
    let user_id = ctx.created_user_id.clone().unwrap_or_else(|| "test".to_string());

    let response = client
        .post_json(UPDATE_ROLE_PATH, &ctx.admin, &json!({ "userId": user_id }))
        .await?;
    let error = expect_rejection(&response, 400, "required")?;

    Ok(rejection_report(
        "Correctly rejected missing parameters",
        &response,
        error,
    ))
}

async fn non_admin_access(client: &AdminApiClient, config: &Config, ctx: &mut RunContext) -> ProbeResult<StepReport> {
    let phone = ctx.phones.next_phone();
    let name = config.customer_name.as_str();

    let otp_response = client.send_otp(&phone, name).await?;
    if otp_response.status != 200 {
        return Err(ProbeError::assertion("Failed to send OTP for customer user"));
    }
    let otp_body: SendOtpResponse = otp_response.json()?;
    let otp = issued_otp(&otp_body, config)
        .ok_or_else(|| ProbeError::assertion("No OTP issued for customer user"))?;

    let login = client.verify_otp(&phone, &otp, name).await?;
    if login.status != 200 {
        return Err(ProbeError::assertion("Failed to login as customer user"));
    }
    let login_body: VerifyOtpResponse = login.json()?;
    let user = login_body.user.unwrap_or_default();
    if !user.has_role(Role::Customer) {
        return Err(ProbeError::assertion(format!(
            "Expected customer role, got {}",
            user.role_display()
        )));
    }
    let customer = Session::from_login(login_body.token, login.cookies.clone());

    let checks = [
        (
            "GET /api/admin/users",
            client.list_users(&customer).await?.status,
        ),
        (
            "POST /api/admin/users",
            client
                .create_user(&customer, "Test", "+919876543210", Role::Customer.as_str())
                .await?
                .status,
        ),
        (
            "POST /api/admin/users/update-role",
            client
                .update_role(&customer, UNKNOWN_USER_ID, Role::SpaOwner.as_str())
                .await?
                .status,
        ),
    ];

    let failed: Vec<String> = checks
        .iter()
        .filter(|(_, status)| *status != 403)
        .map(|(endpoint, status)| format!("{} -> {}", endpoint, status))
        .collect();
    if !failed.is_empty() {
        return Err(ProbeError::assertion(format!(
            "Some endpoints did not return 403: {}",
            failed.join(", ")
        )));
    }

    let results: Map<String, Value> = checks
        .iter()
        .map(|(endpoint, status)| (endpoint.to_string(), Value::from(*status)))
        .collect();

    Ok(StepReport::new(
        "All admin endpoints correctly returned 403 for non-admin user",
    )
    .detail("customer_role", user.role)
    .detail("test_results", results))
}
