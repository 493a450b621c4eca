//! UI logic and callback management module
//!
//! Contains macros for reaching the Slint globals and for connecting `Logic`
//! callbacks to Rust functions.

use crate::slint_generatedAppWindow::AppWindow;

mod hough;
mod pyramid;
mod toast;
mod util;

#[macro_export]
macro_rules! global_store {
    ($ui:expr) => {
        $ui.global::<crate::slint_generatedAppWindow::Store>()
    };
}

#[macro_export]
macro_rules! global_logic {
    ($ui:expr) => {
        $ui.global::<crate::slint_generatedAppWindow::Logic>()
    };
}

#[macro_export]
macro_rules! global_util {
    ($ui:expr) => {
        $ui.global::<crate::slint_generatedAppWindow::Util>()
    };
}

/// Connects `Logic.<callback_name>` to the Rust function of the same name.
///
/// The closure only keeps a weak reference to the window.
#[macro_export]
macro_rules! logic_cb {
    ($callback_name:ident, $ui:expr, $($arg:ident),*) => {
        {{
            let ui_weak = $ui.as_weak();
            paste::paste! {
                crate::global_logic!($ui)
                    .[<on_ $callback_name>](move |$($arg),*| {
                        $callback_name(&ui_weak.unwrap(), $($arg),*)
                    });
            }
        }}
    };
    ($callback_name:ident, $ui:expr) => {
        {{
            let ui_weak = $ui.as_weak();
            paste::paste! {
                crate::global_logic!($ui)
                    .[<on_ $callback_name>](move || {
                        $callback_name(&ui_weak.unwrap())
                    });
            }
        }}
    };
}

pub fn init(ui: &AppWindow) {
    toast::init(ui);
    util::init(ui);
    pyramid::init(ui);
    hough::init(ui);
}

/// Releases resources that outlive the event loop.
pub fn shutdown() {
    hough::release_camera();
}
