use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ureq::unversioned::resolver::DefaultResolver;
use ureq::unversioned::transport::{
    Buffers, ConnectionDetails, Connector, DefaultConnector, NextTimeout, Transport,
};
use url::Url;

use crate::fetch::cancel::CancelToken;
use crate::fetch::locator::ResourceLocator;
use crate::foundation::error::{CardError, CardResult};

/// Largest body accepted from a single resource.
pub const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

const DEFAULT_USER_AGENT: &str = concat!("ogcard/", env!("CARGO_PKG_VERSION"));
const READ_CHUNK: usize = 64 * 1024;
/// Longest a blocking socket read waits before re-checking the cancel token.
const CANCEL_SLICE: Duration = Duration::from_millis(50);

/// Resolves one locator to raw bytes.
///
/// Implementations must be `Send + Sync`: a batch hands the same fetcher to one worker
/// thread per resource. They should return promptly once `cancel` fires.
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource named by `locator`.
    fn fetch(&self, locator: &ResourceLocator, cancel: &CancelToken) -> CardResult<Vec<u8>>;
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for Arc<T> {
    fn fetch(&self, locator: &ResourceLocator, cancel: &CancelToken) -> CardResult<Vec<u8>> {
        (**self).fetch(locator, cancel)
    }
}

/// HTTP(S) GET with a body cap and a timeout clipped to the caller's deadline.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    user_agent: String,
    max_size: u64,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_size: MAX_BODY_BYTES,
        }
    }
}

impl HttpFetcher {
    /// Fetcher with a 30 s timeout and a 10 MiB body cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on a single request; the caller's deadline may shorten it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the body cap in bytes.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// GET `url`, failing on non-2xx status, oversize bodies and cancellation.
    pub fn get(&self, url: &Url, cancel: &CancelToken) -> CardResult<Vec<u8>> {
        cancel.check(&format!("GET {url}"))?;

        let timeout = cancel
            .remaining()
            .map_or(self.timeout, |left| left.min(self.timeout));
        if timeout.is_zero() {
            return Err(CardError::cancelled(format!("GET {url}: deadline passed")));
        }

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        let connector = DefaultConnector::new().chain(CancelConnector {
            cancel: cancel.clone(),
        });
        let agent = ureq::Agent::with_parts(config, connector, DefaultResolver::default());

        let response = agent
            .get(url.as_str())
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => {
                    CardError::fetch(format!("GET {url}: http status {code}"))
                }
                _ if cancel.is_cancelled() => {
                    CardError::cancelled(format!("GET {url}: cancelled"))
                }
                other => CardError::fetch(format!("GET {url}: {other}")),
            })?;

        let body = response.into_body();
        if let Some(len) = body.content_length()
            && len > self.max_size
        {
            return Err(CardError::fetch(format!(
                "GET {url}: body of {len} bytes exceeds the {} byte limit",
                self.max_size
            )));
        }

        read_capped(body.into_reader(), self.max_size, cancel)
            .map_err(|e| e.context(format!("GET {url}")))
    }
}

/// Wraps every connection of one request so blocking reads observe `cancel`.
///
/// A cancelled read fails with a ureq timeout, which drops the connection.
#[derive(Debug)]
struct CancelConnector {
    cancel: CancelToken,
}

impl Connector<Box<dyn Transport>> for CancelConnector {
    type Out = CancelTransport;

    fn connect(
        &self,
        _details: &ConnectionDetails,
        chained: Option<Box<dyn Transport>>,
    ) -> Result<Option<Self::Out>, ureq::Error> {
        Ok(chained.map(|inner| CancelTransport {
            inner,
            cancel: self.cancel.clone(),
        }))
    }
}

#[derive(Debug)]
struct CancelTransport {
    inner: Box<dyn Transport>,
    cancel: CancelToken,
}

fn is_slice_timeout(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::Timeout(_) => true,
        ureq::Error::Io(e) => matches!(
            e.kind(),
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
        ),
        _ => false,
    }
}

impl Transport for CancelTransport {
    fn buffers(&mut self) -> &mut dyn Buffers {
        self.inner.buffers()
    }

    fn transmit_output(&mut self, amount: usize, timeout: NextTimeout) -> Result<(), ureq::Error> {
        if self.cancel.is_cancelled() {
            return Err(ureq::Error::Timeout(timeout.reason));
        }
        self.inner.transmit_output(amount, timeout)
    }

    fn await_input(&mut self, timeout: NextTimeout) -> Result<bool, ureq::Error> {
        let deadline =
            (!timeout.after.is_not_happening()).then(|| Instant::now() + *timeout.after);
        loop {
            if self.cancel.is_cancelled() {
                return Err(ureq::Error::Timeout(timeout.reason));
            }
            let slice = match deadline {
                Some(d) => {
                    let left = d.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(ureq::Error::Timeout(timeout.reason));
                    }
                    left.min(CANCEL_SLICE)
                }
                None => CANCEL_SLICE,
            };
            let next = NextTimeout {
                after: ureq::unversioned::transport::time::Duration::Exact(slice),
                reason: timeout.reason,
            };
            match self.inner.await_input(next) {
                Err(e) if is_slice_timeout(&e) => continue,
                other => return other,
            }
        }
    }

    fn is_open(&mut self) -> bool {
        self.inner.is_open()
    }

    fn is_tls(&self) -> bool {
        self.inner.is_tls()
    }
}

/// Read until EOF in chunks, failing past `max_size` bytes or on cancellation.
fn read_capped(
    mut reader: impl std::io::Read,
    max_size: u64,
    cancel: &CancelToken,
) -> CardResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        cancel.check("body read")?;
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CardError::fetch(format!("read body: {e}"))),
        };
        if out.len() as u64 + n as u64 > max_size {
            return Err(CardError::fetch(format!(
                "body exceeds the {max_size} byte limit"
            )));
        }
        out.extend_from_slice(&chunk[..n]);
    }
    Ok(out)
}

/// Read-only directory of named assets; lookups never leave `root`.
#[derive(Debug, Clone)]
pub struct LocalAssets {
    root: PathBuf,
    max_size: u64,
}

impl LocalAssets {
    /// Serve files directly under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_size: MAX_BODY_BYTES,
        }
    }

    /// Asset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read `name`, which must already be a bare file name.
    pub fn read(&self, name: &str, cancel: &CancelToken) -> CardResult<Vec<u8>> {
        if name.contains(['/', '\\']) || name == ".." {
            return Err(CardError::locator(format!(
                "\"{name}\" is not a bare asset name"
            )));
        }
        cancel.check(&format!("asset '{name}'"))?;

        let path = self.root.join(name);
        let file = std::fs::File::open(&path).map_err(|e| {
            CardError::fetch(format!("open local asset '{}': {e}", path.display()))
        })?;
        read_capped(file, self.max_size, cancel)
            .map_err(|e| e.context(format!("local asset '{}'", path.display())))
    }
}

/// Routes remote locators to [`HttpFetcher`] and local ones to [`LocalAssets`].
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    http: HttpFetcher,
    local: LocalAssets,
}

impl DefaultFetcher {
    /// Combine an HTTP client with a local asset directory.
    pub fn new(http: HttpFetcher, local: LocalAssets) -> Self {
        Self { http, local }
    }

    /// Default HTTP settings with assets under `root`.
    pub fn with_asset_root(root: impl Into<PathBuf>) -> Self {
        Self::new(HttpFetcher::new(), LocalAssets::new(root))
    }
}

impl ResourceFetcher for DefaultFetcher {
    fn fetch(&self, locator: &ResourceLocator, cancel: &CancelToken) -> CardResult<Vec<u8>> {
        match locator {
            ResourceLocator::Remote(url) => self.http.get(url, cancel),
            ResourceLocator::Local(name) => self.local.read(name, cancel),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/fetcher.rs"]
mod tests;
