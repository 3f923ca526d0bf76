use gtk::gio;
use gtk4 as gtk;

pub fn show_error(parent: &gtk::ApplicationWindow, message: &str, detail: &str) {
    log::warn!("{}: {}", message, detail);
    gtk::AlertDialog::builder()
        .modal(true)
        .message(message)
        .detail(detail)
        .build()
        .show(Some(parent));
}

/// Runs `on_accept` only if the user picks `accept_label`.
pub fn confirm(
    parent: &gtk::ApplicationWindow,
    message: &str,
    detail: &str,
    accept_label: &str,
    on_accept: impl FnOnce() + 'static,
) {
    let dialog = gtk::AlertDialog::builder()
        .modal(true)
        .message(message)
        .detail(detail)
        .buttons(["Cancel", accept_label])
        .cancel_button(0)
        .default_button(1)
        .build();

    dialog.choose(Some(parent), None::<&gio::Cancellable>, move |res| {
        if matches!(res, Ok(1)) {
            on_accept();
        }
    });
}
