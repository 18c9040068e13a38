#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

pub trait Notifier {
    fn send(&self, notification: &Notification);
}

/// Logs the notification and echoes it to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(&self, notification: &Notification) {
        tracing::warn!(title = %notification.title, "{}", notification.message);
        eprintln!("{}: {}", notification.title, notification.message);
    }
}

/// Desktop notification through the platform notification service.
#[cfg(feature = "desktop-notify")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

#[cfg(feature = "desktop-notify")]
impl Notifier for DesktopNotifier {
    fn send(&self, notification: &Notification) {
        tracing::warn!(title = %notification.title, "{}", notification.message);
        let shown = notify_rust::Notification::new()
            .summary(&notification.title)
            .body(&notification.message)
            .timeout(notify_rust::Timeout::Milliseconds(10_000))
            .show();
        if let Err(e) = shown {
            tracing::error!(error = %e, "desktop notification failed");
            eprintln!("{}: {}", notification.title, notification.message);
        }
    }
}

pub fn default_notifier(desktop: bool) -> Box<dyn Notifier> {
    #[cfg(feature = "desktop-notify")]
    {
        if desktop {
            return Box::new(DesktopNotifier);
        }
    }
    #[cfg(not(feature = "desktop-notify"))]
    let _ = desktop;
    Box::new(TracingNotifier)
}

pub fn high_usage(cpu: f64, memory: f64, disk: f64) -> Notification {
    Notification {
        title: "High Resource Usage".to_string(),
        message: format!("CPU: {cpu:.1}%, Memory: {memory:.1}%, Disk: {disk:.1}%"),
    }
}
