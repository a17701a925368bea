mod job_error;
mod not_found;

pub use job_error::job_error_response;
pub use not_found::not_found_handler;
