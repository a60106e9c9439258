//! Interrupt handling
//!
//! ```rust,ignore
//! let signal = shutdown::listen();
//! info!("ready");
//! signal.wait().await;
//! ```

use crate::logging::*;

/// Installed stop handlers. Signals that arrive after [`listen`] returns are
/// caught, even before [`ShutdownSignal::wait`] is first polled.
#[cfg(unix)]
pub struct ShutdownSignal {
	sigterm: Option<tokio::signal::unix::Signal>,
	sigint: Option<tokio::signal::unix::Signal>,
}

#[cfg(windows)]
pub struct ShutdownSignal {
	ctrl_c: Option<tokio::signal::windows::CtrlC>,
}

/// Install the SIGINT and SIGTERM handlers (Ctrl-C on Windows).
///
/// If a handler cannot be installed the failure is logged and that signal
/// is simply not awaited. Must be called inside a tokio runtime.
#[cfg(unix)]
pub fn listen() -> ShutdownSignal {
	use tokio::signal::unix::{signal, SignalKind};

	let sigterm = match signal(SignalKind::terminate()) {
		Ok(stream) => Some(stream),
		Err(e) => {
			warn!("Failed to setup SIGTERM handler: {}", e);
			None
		}
	};

	let sigint = match signal(SignalKind::interrupt()) {
		Ok(stream) => Some(stream),
		Err(e) => {
			warn!("Failed to setup SIGINT handler: {}", e);
			None
		}
	};

	ShutdownSignal { sigterm, sigint }
}

#[cfg(windows)]
pub fn listen() -> ShutdownSignal {
	let ctrl_c = match tokio::signal::windows::ctrl_c() {
		Ok(stream) => Some(stream),
		Err(e) => {
			warn!("Failed to listen for Ctrl-C: {}", e);
			None
		}
	};
	ShutdownSignal { ctrl_c }
}

#[cfg(unix)]
impl ShutdownSignal {
	/// Wait until the process is asked to stop
	pub async fn wait(mut self) {
		tokio::select! {
			_ = recv(&mut self.sigterm) => debug!("Received SIGTERM"),
			_ = recv(&mut self.sigint) => debug!("Received SIGINT"),
		}
	}
}

#[cfg(unix)]
async fn recv(stream: &mut Option<tokio::signal::unix::Signal>) {
	match stream {
		Some(stream) => {
			stream.recv().await;
		}
		None => std::future::pending::<()>().await,
	}
}

#[cfg(windows)]
impl ShutdownSignal {
	/// Wait until the process is asked to stop
	pub async fn wait(mut self) {
		match self.ctrl_c {
			Some(ref mut stream) => {
				stream.recv().await;
			}
			None => std::future::pending::<()>().await,
		}
		debug!("Received Ctrl-C");
	}
}


// vim: ts=4
