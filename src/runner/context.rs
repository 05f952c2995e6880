use crate::api::Session;

/// Country prefix of every phone the suite generates
pub const PHONE_PREFIX: &str = "+91";
const PHONE_SPACE: u64 = 10_000_000_000;

/// Hands out phones that are unique within a run and unlikely to clash across runs.
///
/// The first number is the current unix time mod 10^10; each later one is the
/// previous number plus one, wrapping inside the same 10-digit space.
#[derive(Debug, Clone, Default)]
pub struct PhoneAllocator {
    next: Option<u64>,
}

impl PhoneAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(number: u64) -> Self {
        Self {
            next: Some(number % PHONE_SPACE),
        }
    }

    pub fn next_phone(&mut self) -> String {
        let number = self
            .next
            .unwrap_or_else(|| chrono::Utc::now().timestamp().rem_euclid(PHONE_SPACE as i64) as u64);
        self.next = Some((number + 1) % PHONE_SPACE);
        format!("{}{:010}", PHONE_PREFIX, number)
    }
}

/// State carried from one step to the next during a single run
#[derive(Debug, Default)]
pub struct RunContext {
    /// OTP issued to the admin by the first step
    pub otp: Option<String>,

    /// Admin credentials from the login step
    pub admin: Session,

    /// Admin's user id as reported at login
    pub admin_user_id: Option<String>,

    /// User created by the create-user step
    pub created_user_id: Option<String>,
    pub created_user_phone: Option<String>,

    pub phones: PhoneAllocator,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phones(phones: PhoneAllocator) -> Self {
        Self {
            phones,
            ..Self::default()
        }
    }
}
