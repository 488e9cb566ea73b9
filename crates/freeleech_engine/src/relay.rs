//! Upload of saved payload files to a remote FTP folder.

use std::fs::File;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::targets::FTP;
use engine_logging::{engine_debug, engine_info, engine_warn};
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};
use thiserror::Error;

/// Applies to the connect and to every read and write on the control socket.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound for one whole upload, data transfer included.
pub const DEFAULT_UPLOAD_DEADLINE: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("could not resolve {0}")]
    Resolve(String),
    #[error("ftp error: {0}")]
    Ftp(#[from] FtpError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("path has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("upload task failed: {0}")]
    Task(String),
    #[error("upload did not finish within {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub folder: String,
}

impl RelaySettings {
    /// `user@host:port/folder`, without the password.
    pub fn describe(&self) -> String {
        format!("{}@{}:{}{}", self.user, self.host, self.port, self.folder)
    }
}

/// Destination for saved payload files.
#[async_trait::async_trait]
pub trait RelaySink: Send + Sync {
    async fn relay(&self, path: &Path) -> Result<(), RelayError>;
}

/// Directory operations needed to position the upload.
pub trait RemoteDirectory {
    fn current_dir(&mut self) -> Result<String, RelayError>;
    fn change_dir(&mut self, path: &str) -> Result<(), RelayError>;
    fn make_dir(&mut self, path: &str) -> Result<(), RelayError>;
    fn listing(&mut self) -> Result<Vec<String>, RelayError>;
}

/// Where the upload ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Target,
    /// The folder did not exist and was created.
    Created,
    /// Neither entering nor creating the folder worked; stays in `current`.
    Fallback { current: String },
}

/// Enter `folder`, creating it if needed; otherwise stay where login put us.
pub fn enter_target_dir(
    remote: &mut dyn RemoteDirectory,
    folder: &str,
) -> Result<Placement, RelayError> {
    let current = remote.current_dir()?;
    engine_debug!(target: FTP, "Current directory: {}", current);

    let cwd_err = match remote.change_dir(folder) {
        Ok(()) => {
            engine_info!(target: FTP, "Changed to directory: {}", folder);
            return Ok(Placement::Target);
        }
        Err(err) => err,
    };
    engine_warn!(target: FTP, "Could not change to {}: {}", folder, cwd_err);

    match remote.listing() {
        Ok(entries) => {
            engine_info!(target: FTP, "Available in {}:", current);
            for entry in entries {
                engine_info!(target: FTP, "  {}", entry);
            }
        }
        Err(err) => engine_debug!(target: FTP, "Listing failed: {}", err),
    }

    engine_info!(target: FTP, "Attempting to create directory: {}", folder);
    let created = remote
        .make_dir(folder)
        .and_then(|()| remote.change_dir(folder));
    match created {
        Ok(()) => {
            engine_info!(target: FTP, "Created and changed to {}", folder);
            Ok(Placement::Created)
        }
        Err(err) => {
            engine_warn!(target: FTP, "Could not create directory: {}", err);
            engine_info!(target: FTP, "Uploading to current directory: {}", current);
            Ok(Placement::Fallback { current })
        }
    }
}

impl RemoteDirectory for FtpStream {
    fn current_dir(&mut self) -> Result<String, RelayError> {
        Ok(self.pwd()?)
    }

    fn change_dir(&mut self, path: &str) -> Result<(), RelayError> {
        Ok(self.cwd(path)?)
    }

    fn make_dir(&mut self, path: &str) -> Result<(), RelayError> {
        Ok(self.mkdir(path)?)
    }

    fn listing(&mut self) -> Result<Vec<String>, RelayError> {
        Ok(self.list(None)?)
    }
}

/// Uploads over plain FTP with a fresh control connection per file.
#[derive(Debug, Clone)]
pub struct FtpRelay {
    settings: RelaySettings,
    io_timeout: Duration,
    deadline: Duration,
}

impl FtpRelay {
    pub fn new(settings: RelaySettings) -> Self {
        Self {
            settings,
            io_timeout: DEFAULT_IO_TIMEOUT,
            deadline: DEFAULT_UPLOAD_DEADLINE,
        }
    }

    pub fn with_timeouts(mut self, io_timeout: Duration, deadline: Duration) -> Self {
        self.io_timeout = io_timeout;
        self.deadline = deadline;
        self
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    fn upload_blocking(
        settings: &RelaySettings,
        io_timeout: Duration,
        path: &Path,
    ) -> Result<(), RelayError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RelayError::NoFileName(path.to_path_buf()))?;
        engine_info!(
            target: FTP,
            "Uploading {} to {}:{}{}",
            name,
            settings.host,
            settings.port,
            settings.folder
        );

        let addr = (settings.host.as_str(), settings.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| RelayError::Resolve(settings.host.clone()))?;
        let socket = TcpStream::connect_timeout(&addr, io_timeout)?;
        socket.set_read_timeout(Some(io_timeout))?;
        socket.set_write_timeout(Some(io_timeout))?;
        // The welcome banner is read here, so the timeouts must already be set.
        let mut ftp = FtpStream::connect_with_stream(socket)?;
        ftp.login(&settings.user, &settings.pass)?;

        enter_target_dir(&mut ftp, &settings.folder)?;

        ftp.transfer_type(FileType::Binary)?;
        let mut file = File::open(path)?;
        ftp.put_file(name, &mut file)?;
        // The file is stored; a failed goodbye does not undo that.
        if let Err(err) = ftp.quit() {
            engine_debug!(target: FTP, "QUIT failed: {}", err);
        }
        engine_info!(target: FTP, "✓ Uploaded successfully");
        Ok(())
    }
}

#[async_trait::async_trait]
impl RelaySink for FtpRelay {
    async fn relay(&self, path: &Path) -> Result<(), RelayError> {
        let settings = self.settings.clone();
        let io_timeout = self.io_timeout;
        let path = path.to_path_buf();
        let upload =
            tokio::task::spawn_blocking(move || Self::upload_blocking(&settings, io_timeout, &path));
        match tokio::time::timeout(self.deadline, upload).await {
            Ok(joined) => joined.map_err(|err| RelayError::Task(err.to_string()))?,
            Err(_) => Err(RelayError::TimedOut(self.deadline)),
        }
    }
}
