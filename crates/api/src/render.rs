//! Escaping for provider-supplied text echoed back to the admin UI.

use drivebridge_services::DriveFile;

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

pub fn escape_file(file: DriveFile) -> DriveFile {
    DriveFile {
        name: escape_html(&file.name),
        ..file
    }
}
