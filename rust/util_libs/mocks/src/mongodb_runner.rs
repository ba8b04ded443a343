#![allow(dead_code)]

use anyhow::Context;
use mongodb::{options::ClientOptions, Client as MongoDBClient};
use std::{path::PathBuf, process::Stdio, str::FromStr};
use tempfile::TempDir;

const READY_POLLS: usize = 10;
const READY_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3);

/// Ephemeral `mongod` listening only on a unix domain socket inside a
/// temporary directory. The process is killed when the runner is dropped.
pub struct MongodRunner {
    child: std::process::Child,
    // keeps the socket and data directory alive
    tempdir: TempDir,
}

impl MongodRunner {
    fn socket_path(tempdir: &TempDir) -> anyhow::Result<String> {
        let dir = tempdir.path().canonicalize()?;
        let dir = dir
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("can't convert path to str"))?;
        Ok(format!("{dir}/mongod.sock"))
    }

    pub fn run() -> anyhow::Result<Self> {
        let tempdir = TempDir::new().context("Failed to create tempdir.")?;
        let socket_path = Self::socket_path(&tempdir)?;
        let socket_file = PathBuf::from(&socket_path);

        let child = std::process::Command::new("mongod")
            .args([
                "--unixSocketPrefix",
                &tempdir.path().to_string_lossy(),
                "--dbpath",
                &tempdir.path().to_string_lossy(),
                "--bind_ip",
                &socket_path,
                "--port",
                "0",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to start mongod")?;

        let runner = Self { child, tempdir };

        for _ in 0..READY_POLLS {
            if socket_file.exists() {
                break;
            }
            std::thread::sleep(READY_POLL_INTERVAL);
        }
        if !socket_file.exists() {
            return Err(anyhow::anyhow!(
                "MongoDB did not create the socket file in time"
            ));
        }

        log::info!("MongoDB test server is running at {socket_path}");
        Ok(runner)
    }

    pub fn socket_pathbuf(&self) -> anyhow::Result<PathBuf> {
        Ok(PathBuf::from_str(&Self::socket_path(&self.tempdir)?)?)
    }

    /// Connection string for the socket, percent-encoded as the driver expects.
    pub fn uri(&self) -> anyhow::Result<String> {
        let path = Self::socket_path(&self.tempdir)?;
        Ok(format!("mongodb://{}", urlencoding::encode(&path)))
    }

    pub fn client(&self) -> anyhow::Result<MongoDBClient> {
        let server_address = mongodb::options::ServerAddress::Unix {
            path: self.socket_pathbuf()?,
        };
        let client_options = ClientOptions::builder().hosts(vec![server_address]).build();
        Ok(MongoDBClient::with_options(client_options)?)
    }
}

impl Drop for MongodRunner {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            log::warn!("Failed to stop mongod: {e}");
        }
        let _ = self.child.wait();
    }
}
