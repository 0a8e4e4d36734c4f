/// unwrap a service result inside a route.
/// on error the failure is logged under `$target` and the route returns the json error.
/// server side errors are answered with `$fallback` instead of their details.
macro_rules! race_handle_error_http {
    ( $data:expr, $target:expr, $fallback:expr ) => {
        match $data {
            Ok(e) => e,
            Err(error) => {
                let api_error = $crate::errors::ApiError::from_error(&error, $fallback);
                if api_error.status.code >= 500 {
                    log::error!(target: $target, "{}. (error: {})", $fallback, error);
                } else {
                    log::warn!(target: $target, "{}", error);
                }
                return Err(api_error);
            }
        }
    };
}

pub(crate) use race_handle_error_http;
