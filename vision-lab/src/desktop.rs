#![windows_subsystem = "windows"]

fn main() {
    extern crate vision_lab;

    vision_lab::desktop_main();
}
