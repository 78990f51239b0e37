use crate::portal::Portal;

pub const SEND_OTP_ACTION: &str = "/v1/otp";
pub const VERIFY_OTP_ACTION: &str = "/v1/otp/verify";

/// The login form shared by both portals.
///
/// "Send OTP" asks the server to email a fresh code to the admin address, the
/// submit button checks the typed code. Both post JSON through `FORM_SCRIPT`.
#[must_use]
pub fn login_form(portal: Portal) -> String {
    let slug = portal.slug();
    format!(
        r#"<form class="login-form" id="{slug}-login-form" method="post" action="{VERIFY_OTP_ACTION}" data-portal="{slug}">
    <input type="hidden" name="portal" value="{slug}">
    <label for="{slug}-otp">One-time password</label>
    <input id="{slug}-otp" name="otp" type="text" inputmode="numeric" autocomplete="one-time-code" pattern="[0-9]{{4,10}}" required>
    <div class="actions">
        <button type="button" class="secondary" data-action="{SEND_OTP_ACTION}">Send OTP</button>
        <button type="submit">Log in</button>
    </div>
    <p class="status" role="status"></p>
</form>"#
    )
}

/// Posts the form as JSON and shows the outcome in the status line.
pub const FORM_SCRIPT: &str = r#"<script>
document.querySelectorAll("form.login-form").forEach(function (form) {
    var status = form.querySelector(".status");
    var portal = form.dataset.portal;
    function post(url, body) {
        return fetch(url, {
            method: "POST",
            headers: { "Content-Type": "application/json" },
            body: JSON.stringify(body)
        }).then(function (res) { return res.json(); });
    }
    form.querySelector("[data-action]").addEventListener("click", function (event) {
        post(event.target.dataset.action, { portal: portal }).then(function (data) {
            status.textContent = data.sent ? "OTP sent to the admin." : "Could not send the OTP, try again.";
        });
    });
    form.addEventListener("submit", function (event) {
        event.preventDefault();
        post(form.action, { portal: portal, otp: form.otp.value }).then(function (data) {
            status.textContent = data.valid ? "Login verified." : "Invalid or expired OTP.";
        });
    });
});
</script>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_carries_portal_and_actions() {
        let form = login_form(Portal::Warden);
        assert!(form.contains(r#"id="warden-login-form""#));
        assert!(form.contains(r#"name="portal" value="warden""#));
        assert!(form.contains(r#"action="/v1/otp/verify""#));
        assert!(form.contains(r#"data-action="/v1/otp""#));
        assert!(form.contains(r#"pattern="[0-9]{4,10}""#));
    }
}
