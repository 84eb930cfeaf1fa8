mod session;

pub use session::{
    get_session_token_from_headers, get_user_from_session, get_verified_user,
    invalidate_session_cache, prepare_logout_response,
};

pub(crate) use session::{cache_authenticated_user, create_session_response};
