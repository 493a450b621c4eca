fn main() {
    slint_build::compile("ui/appwindow.slint").expect("compile slint files failed");
}
