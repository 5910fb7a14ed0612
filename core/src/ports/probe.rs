//! Socket probe port (interface).

use crate::domain::Platform;
use crate::error::Result;

/// Port for listing listening sockets.
///
/// Implementations run the platform's native listing command once per call
/// and hand back its raw output lines; parsing is done by the registry
/// builder with the scheme for [`SocketProbe::platform`].
pub trait SocketProbe: Send + Sync {
    /// The platform whose output format the lines follow.
    fn platform(&self) -> Platform;

    /// List listening sockets as raw, platform-native lines.
    ///
    /// Spawns exactly one external process and waits for it. A spawn failure
    /// or non-zero exit is returned as [`crate::Error::CommandFailed`].
    fn list_listening_sockets(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}
