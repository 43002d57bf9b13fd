use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    ConfigurationError(String),
    AuthenticationError(String),
    UpstreamRequestError(String),
    NoStationFound,
    InvalidResponse(String, String),
    UnexpectedApiResponse(String),
    InternalError(String),
}

impl Error {
    /// Short label used for the failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigurationError(_) => "configuration",
            Error::AuthenticationError(_) => "authentication",
            Error::UpstreamRequestError(_) => "upstream_request",
            Error::NoStationFound => "no_station",
            Error::InvalidResponse(_, _) => "invalid_response",
            Error::UnexpectedApiResponse(_) => "unexpected_response",
            Error::InternalError(_) => "internal",
        }
    }

    fn status(&self) -> Status {
        match self {
            Error::NoStationFound => Status::NotFound,
            _ => Status::InternalServerError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigurationError(s)
            | Error::AuthenticationError(s)
            | Error::UpstreamRequestError(s)
            | Error::UnexpectedApiResponse(s)
            | Error::InternalError(s) => f.write_str(s),
            Error::NoStationFound => f.write_str("No station found"),
            Error::InvalidResponse(body, reason) => {
                write!(f, "Invalid upstream response ({}): {}", reason, body)
            }
        }
    }
}

impl std::error::Error for Error {}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        log::warn!("Responding {}: {}", status, self);

        let body = serde_json::json!({ "error": self.to_string() }).to_string();
        Response::build()
            .status(status)
            .sized_body(body.len(), Cursor::new(body))
            .header(ContentType::JSON)
            .ok()
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn display_is_raw_message() {
        let e = Error::AuthenticationError(String::from("No access_token returned: {}"));
        assert_eq!("No access_token returned: {}", e.to_string());
        assert_eq!("No station found", Error::NoStationFound.to_string());
    }

    #[test]
    fn only_missing_station_is_not_found() {
        assert_eq!(404, Error::NoStationFound.status().code);
        assert_eq!(
            500,
            Error::ConfigurationError(String::new()).status().code
        );
        assert_eq!(
            500,
            Error::UpstreamRequestError(String::new()).status().code
        );
    }
}
