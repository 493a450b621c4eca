//! Toast notification module
//!
//! Replaces modal message boxes: a short message is shown on top of the
//! window and hidden again after a timeout.

use crate::{
    global_util,
    slint_generatedAppWindow::{AppWindow, ToastSetting, ToastStatus},
};
use slint::{ComponentHandle, Timer, TimerMode, Weak};

#[macro_export]
macro_rules! toast_warn {
    ($ui:expr, $msg:expr) => {
        $ui.global::<$crate::slint_generatedAppWindow::Util>()
            .invoke_show_toast(
                slint::format!("{}", $msg),
                $crate::slint_generatedAppWindow::ToastStatus::Warning,
            )
    };
}

/// Shows warning toast notification from a worker thread
pub fn async_toast_warn(ui: Weak<AppWindow>, msg: String) {
    _ = ui.upgrade_in_event_loop(move |ui| {
        global_util!(ui).invoke_show_toast(slint::format!("{}", msg), ToastStatus::Warning);
    });
}

/// Shows success toast notification from a worker thread
pub fn async_toast_success(ui: Weak<AppWindow>, msg: String) {
    _ = ui.upgrade_in_event_loop(move |ui| {
        global_util!(ui).invoke_show_toast(slint::format!("{}", msg), ToastStatus::Success);
    });
}

pub fn init(ui: &AppWindow) {
    let timer = Timer::default();
    let ui_weak = ui.as_weak();
    global_util!(ui).on_show_toast(move |msg, status| {
        let ui = ui_weak.unwrap();

        if timer.running() {
            timer.stop();
        }

        let interval = if msg.chars().count() > 20 { 5 } else { 2 };

        match status {
            ToastStatus::Warning => log::warn!("{msg}"),
            _ => log::info!("{msg}"),
        }

        ui.global::<ToastSetting>().set_is_timeout(false);
        ui.global::<ToastSetting>().invoke_set(msg, status);

        let ui_weak = ui.as_weak();
        timer.start(
            TimerMode::SingleShot,
            std::time::Duration::from_secs(interval),
            move || {
                if let Some(ui) = ui_weak.upgrade() {
                    ui.global::<ToastSetting>().set_is_timeout(true);
                }
            },
        );
    });
}
