//! HTML pages served by the portal.
//!
//! Every page except the configuration form is a fixed string. The form
//! lists the scanned networks and is capped at [`MAX_PAGE_BYTES`]: network
//! entries that do not fit are dropped, the input fields always make it.

use crate::wifi::ScanSnapshot;
use std::fmt::Write;

/// Upper bound on the rendered configuration page.
pub const MAX_PAGE_BYTES: usize = 8192;

macro_rules! style {
    () => {
        concat!(
            "<style>",
            "body{font-family:Arial,sans-serif;background:#f2f2f2;text-align:center;margin-top:50px;}",
            "form{background:#fff;padding:20px;border-radius:10px;display:inline-block;box-shadow:0 2px 8px rgba(0,0,0,0.2);}",
            "input[type=text],input[type=password]{width:80%;padding:10px;margin:5px;border-radius:5px;border:1px solid #ccc;}",
            "input[type=submit],a.button{background:#03A9F4;color:#fff;padding:10px 20px;text-decoration:none;border-radius:5px;display:inline-block;margin:10px;}",
            "input[type=submit]:hover,a.button:hover{background:#0288D1;}",
            "</style>"
        )
    };
}

/// Stylesheet shared by every page.
const STYLE: &str = style!();

macro_rules! page {
    ($title:literal, $body:literal) => {
        concat!(
            "<!DOCTYPE html><html><head><meta charset='UTF-8'>",
            "<meta name='viewport' content='width=device-width,initial-scale=1'>",
            "<title>",
            $title,
            "</title>",
            style!(),
            "</head><body>",
            $body,
            "</body></html>"
        )
    };
}

pub const LANDING_PAGE: &str = page!(
    "WiFi Manager",
    "<h1>WiFi Manager</h1>\
<a class='button' href='/login'>Configure WiFi</a>\
<a class='button' href='/exit'>Exit</a>"
);

pub const INVALID_LOGIN_PAGE: &str = page!(
    "Login",
    "<h3>Invalid login!</h3><a class='button' href='/login'>Try again</a>"
);

pub const LOGOUT_PAGE: &str = page!(
    "Logout",
    "<h2>Logged out successfully!</h2><a class='button' href='/login'>Go to login</a>"
);

pub const ACCESS_DENIED_PAGE: &str = page!(
    "Access denied",
    "<h3>Access denied! Log in first.</h3><a class='button' href='/login'>Go to login</a>"
);

pub const SAVED_PAGE: &str = page!(
    "Saved",
    "<h3>Settings saved!</h3><a class='button' href='/'>Back</a>"
);

pub const EXIT_PAGE: &str = page!(
    "Goodbye",
    "<h2>Leaving configuration mode</h2><p>Thank you!</p>"
);

pub const NOT_FOUND: &str = "Not Found";

pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";

/// Login form. Submits `user` and `pass` to `/do_login`.
pub fn login_page() -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset='UTF-8'><title>Login</title>{}</head><body>\
<h2>Login</h2>\
<form action='/do_login' method='get'>\
Username:<br><input type='text' name='user'><br><br>\
Password:<br><input type='password' name='pass'><br><br>\
<input type='submit' value='Sign in'>\
</form></body></html>",
        STYLE
    )
}

const CONFIG_TAIL: &str = "<br>SSID: <input type='text' id='ssid' name='ssid'><br><br>\
WiFi password: <input type='password' name='pass'><br><br>\
Static IP: <input type='text' name='ip'><br><br>\
Gateway: <input type='text' name='gateway'><br><br>\
Subnet mask: <input type='text' name='mask'><br><br>\
DNS: <input type='text' name='dns'><br><br>\
<input type='submit' value='Save'>\
</form><br>\
<a class='button' href='/logout'>Logout</a>\
</body></html>";

/// Configuration form listing `snapshot` as selectable networks.
///
/// The result never exceeds [`MAX_PAGE_BYTES`].
pub fn config_page(snapshot: &ScanSnapshot) -> String {
    let mut page = String::with_capacity(MAX_PAGE_BYTES);
    page.push_str("<!DOCTYPE html><html><head><meta charset='UTF-8'><title>Configure WiFi</title>");
    page.push_str(STYLE);
    page.push_str(
        "<script>function fillSSID(ssid){document.getElementById('ssid').value=ssid;}</script>\
</head><body><h2>Configure WiFi</h2>\
<form action='/submit' method='get'>\
Available networks:<br>",
    );

    let budget = MAX_PAGE_BYTES.saturating_sub(CONFIG_TAIL.len());
    let mut entry = String::new();
    let mut dropped = 0;

    for ap in snapshot {
        entry.clear();
        let ssid = escape_html(ap.ssid());
        // write! into a String cannot fail.
        let _ = write!(
            entry,
            "<input type='radio' name='ssid_select' value='{ssid}' onclick='fillSSID(this.value)'>{ssid} (RSSI:{})<br>",
            ap.signal_strength()
        );

        if page.len() + entry.len() <= budget {
            page.push_str(&entry);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::warn!("Configuration page full, dropped {} network(s)", dropped);
    }

    page.push_str(CONFIG_TAIL);
    page
}

/// Escape text for HTML element content and single- or double-quoted
/// attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wifi::AccessPointRecord;

    fn snapshot(count: usize, ssid_len: usize) -> ScanSnapshot {
        ScanSnapshot::from_records(
            (0..count).map(|i| {
                let name = format!("{:0>width$}", i, width = ssid_len);
                AccessPointRecord::new(&name, -40)
            }),
            count,
        )
    }

    #[test]
    fn test_config_page_lists_networks() {
        let snap = ScanSnapshot::from_records(
            [
                AccessPointRecord::new("HomeNet", -42),
                AccessPointRecord::new("Cafe", -77),
            ],
            20,
        );
        let page = config_page(&snap);

        assert!(page.contains("HomeNet (RSSI:-42)"));
        assert!(page.contains("Cafe (RSSI:-77)"));
        assert!(page.contains("name='ssid'"));
        assert!(page.contains("name='dns'"));
        assert!(page.ends_with("</html>"));
    }

    #[test]
    fn test_config_page_empty_snapshot_has_fields() {
        let page = config_page(&ScanSnapshot::default());
        assert!(page.contains("<input type='text' id='ssid' name='ssid'>"));
        assert!(!page.contains("ssid_select"));
    }

    #[test]
    fn test_config_page_bounded() {
        // 20 maximal SSIDs made entirely of escaped characters.
        let snap = ScanSnapshot::from_records(
            (0..20).map(|_| AccessPointRecord::new(&"&".repeat(32), -99)),
            20,
        );
        let page = config_page(&snap);

        assert!(page.len() <= MAX_PAGE_BYTES, "page is {} bytes", page.len());
        assert!(page.ends_with(CONFIG_TAIL));
    }

    #[test]
    fn test_config_page_full_snapshot_fits() {
        let page = config_page(&snapshot(20, 32));
        assert!(page.len() <= MAX_PAGE_BYTES);
        assert_eq!(page.matches("ssid_select").count(), 20);
    }

    #[test]
    fn test_ssid_is_escaped() {
        let snap = ScanSnapshot::from_records(
            [AccessPointRecord::new("<script>x</script>'", -50)],
            20,
        );
        let page = config_page(&snap);
        assert!(!page.contains("<script>x</script>"));
        assert!(page.contains("&lt;script&gt;x&lt;/script&gt;&#39;"));
    }

    #[test]
    fn test_fixed_pages_have_no_inputs() {
        for page in [ACCESS_DENIED_PAGE, INVALID_LOGIN_PAGE, LOGOUT_PAGE, SAVED_PAGE] {
            assert!(!page.contains("<input"));
        }
    }

    #[test]
    fn test_login_page_fields() {
        let page = login_page();
        assert!(page.contains("action='/do_login'"));
        assert!(page.contains("name='user'"));
        assert!(page.contains("name='pass'"));
    }

    #[test]
    fn test_every_page_shares_one_stylesheet() {
        let config = config_page(&ScanSnapshot::default());
        let login = login_page();
        for page in [
            LANDING_PAGE,
            INVALID_LOGIN_PAGE,
            LOGOUT_PAGE,
            ACCESS_DENIED_PAGE,
            SAVED_PAGE,
            EXIT_PAGE,
            login.as_str(),
            config.as_str(),
        ] {
            assert!(page.contains(STYLE));
            assert_eq!(page.matches("<style>").count(), 1);
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a&b\"c"), "a&amp;b&quot;c");
        assert_eq!(escape_html("plain"), "plain");
    }
}
