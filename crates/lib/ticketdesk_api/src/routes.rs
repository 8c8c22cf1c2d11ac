//! Route paths. All are relative to [`API_PREFIX`].

pub const API_PREFIX: &str = "/api/v1";

pub const POST_REGISTER: &str = "/register";
pub const POST_LOGIN: &str = "/login";
pub const POST_REFRESH_TOKEN: &str = "/refresh-token";
pub const POST_LOGOUT: &str = "/logout";
pub const GET_PROFILE: &str = "/profile";

pub const TICKETS: &str = "/tickets";
pub const TICKETS_ID: &str = "/tickets/{id}";
pub const PATCH_TICKETS_ID_PENDING: &str = "/tickets/{id}/pending";
pub const PATCH_TICKETS_ID_COMPLETED: &str = "/tickets/{id}/completed";

pub const GET_USERS: &str = "/users";
pub const GET_USERS_ID: &str = "/users/{id}";
