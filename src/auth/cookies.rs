use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Request-scoped view of the cookie jar handed to the identity provider.
///
/// Reads see the inbound snapshot only. Writes are recorded in order and
/// turned into `Set-Cookie` headers once the response exists.
#[derive(Debug, Default)]
pub struct CookieAdapter {
    inbound: Vec<Cookie<'static>>,
    outbound: Vec<Cookie<'static>>,
}

impl CookieAdapter {
    pub fn new(inbound: Vec<Cookie<'static>>) -> Self {
        CookieAdapter {
            inbound,
            outbound: Vec::new(),
        }
    }

    pub fn from_jar(jar: &CookieJar) -> Self {
        Self::new(jar.iter().cloned().collect())
    }

    pub fn get_all(&self) -> &[Cookie<'static>] {
        &self.inbound
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inbound
            .iter()
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value())
    }

    /// Records cookies to send back. Path is always pinned to `/`.
    pub fn set_all(&mut self, cookies: impl IntoIterator<Item = Cookie<'static>>) {
        for mut cookie in cookies {
            cookie.set_path("/");
            self.outbound.push(cookie);
        }
    }

    pub fn outbound(&self) -> &[Cookie<'static>] {
        &self.outbound
    }

    pub fn into_outbound(self) -> Vec<Cookie<'static>> {
        self.outbound
    }

    /// Reads a value that may have been split across `name.0`, `name.1`, ...
    pub fn get_chunked(&self, name: &str) -> Option<String> {
        if let Some(value) = self.get(name) {
            return Some(value.to_owned());
        }

        let mut value = String::new();
        for index in 0.. {
            let Some(chunk) = self.get(&format!("{name}.{index}")) else {
                break;
            };
            value.push_str(chunk);
        }

        (!value.is_empty()).then_some(value)
    }

    /// Names of every inbound cookie belonging to `name`, chunks included.
    pub fn chunk_names(&self, name: &str) -> Vec<String> {
        let chunk_prefix = format!("{name}.");
        self.inbound
            .iter()
            .map(|cookie| cookie.name())
            .filter(|cookie_name| {
                *cookie_name == name
                    || cookie_name
                        .strip_prefix(&chunk_prefix)
                        .is_some_and(|index| index.parse::<usize>().is_ok())
            })
            .map(String::from)
            .collect()
    }
}

/// Splits an ASCII cookie value into `(name, value)` pairs of at most `chunk_size` bytes.
pub fn chunk_value(name: &str, value: &str, chunk_size: usize) -> Vec<(String, String)> {
    if value.len() <= chunk_size {
        return vec![(name.to_owned(), value.to_owned())];
    }

    value
        .as_bytes()
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, chunk)| {
            (
                format!("{name}.{index}"),
                String::from_utf8_lossy(chunk).into_owned(),
            )
        })
        .collect()
}

pub fn removal(name: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.make_removal();
    cookie
}

pub fn append_set_cookies(headers: &mut HeaderMap, cookies: &[Cookie<'static>]) {
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(err) => tracing::warn!("Dropping unencodable cookie {}: {err}", cookie.name()),
        }
    }
}
