//! Process terminator port (interface).

/// Port for killing processes.
///
/// None of these methods fail loudly: outcomes are reported as booleans and
/// every error is logged at the point of invocation.
pub trait ProcessTerminator: Send + Sync {
    /// Forcefully kill a process. Returns `false` on any failure
    /// (no permission, no such process, command missing).
    fn terminate(&self, pid: u32) -> impl std::future::Future<Output = bool> + Send;

    /// Check whether a pid is still present.
    ///
    /// Only meant for polling after an elevated kill; a pid reused by the OS
    /// in the meantime counts as existing.
    fn exists(&self, pid: u32) -> impl std::future::Future<Output = bool> + Send;

    /// Launch an elevated kill and return immediately.
    ///
    /// The outcome is not observable here; callers poll [`Self::exists`]
    /// after a grace period.
    fn terminate_elevated(&self, pid: u32, process_label: &str);
}
