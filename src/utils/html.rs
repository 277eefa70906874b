use crate::services::recap::DailyRecap;

/// Generates the HTML body of the daily recap email.
///
/// Inline CSS only, laid out with tables for email client compatibility.
pub fn generate_recap_email_html(recap: &DailyRecap) -> String {
    let current_year = time::OffsetDateTime::now_utc().year();
    let greeting = match &recap.name {
        Some(name) => format!("Bonsoir {} !", escape(name)),
        None => "Bonsoir !".to_string(),
    };
    let profession_row = match &recap.profession {
        Some((label, niveau)) => format!(
            r#"<tr><td style="padding: 8px 0; color: #606770;">{}</td><td align="right" style="padding: 8px 0; font-weight: 600;">Niveau {niveau} / 5</td></tr>"#,
            escape(label)
        ),
        None => String::new(),
    };
    let energy = match recap.energy_score {
        Some(score) => format!("{score}%"),
        None => "Pas encore de bilan aujourd'hui".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Votre récap Énergie</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; background-color: #f0f5f2;">

    <div style="display:none;font-size:1px;color:#ffffff;line-height:1px;max-height:0px;max-width:0px;opacity:0;overflow:hidden;">
        {quests_done} quête(s) accomplie(s) aujourd'hui
    </div>

    <table width="100%" border="0" cellspacing="0" cellpadding="0" style="background-color: #f0f5f2;">
        <tr>
            <td align="center" style="padding: 20px;">
                <table width="600" border="0" cellspacing="0" cellpadding="0" style="max-width: 600px; width: 100%; background-color: #ffffff; border-radius: 12px; box-shadow: 0 4px 12px rgba(0,0,0,0.08);">

                    <tr>
                        <td align="center" style="padding: 40px 20px 20px 20px;">
                            <h1 style="margin: 0; color: #1c1e21; font-size: 28px; font-weight: 600;">⚡ {greeting}</h1>
                            <p style="margin: 4px 0 0 0; color: #606770; font-size: 14px;">Votre récap du jour</p>
                        </td>
                    </tr>

                    <tr>
                        <td style="padding: 20px 40px;">
                            <table width="100%" border="0" cellspacing="0" cellpadding="0" style="font-size: 16px; color: #1c1e21;">
                                <tr><td style="padding: 8px 0; color: #606770;">Niveau</td><td align="right" style="padding: 8px 0; font-weight: 600;">{level}</td></tr>
                                <tr><td style="padding: 8px 0; color: #606770;">XP total</td><td align="right" style="padding: 8px 0; font-weight: 600;">{xp}</td></tr>
                                {profession_row}
                                <tr><td style="padding: 8px 0; color: #606770;">Quêtes du jour</td><td align="right" style="padding: 8px 0; font-weight: 600;">{quests_done}</td></tr>
                                <tr><td style="padding: 8px 0; color: #606770;">Score d'énergie</td><td align="right" style="padding: 8px 0; font-weight: 600;">{energy}</td></tr>
                            </table>
                        </td>
                    </tr>

                    <tr>
                        <td align="center" style="padding: 20px 40px 40px 40px; border-top: 1px solid #dddfe2;">
                            <p style="margin: 0; font-size: 12px; color: #8a8d91;">Vous recevez cet email car le récap quotidien est activé sur votre compte.</p>
                            <p style="margin: 8px 0 0 0; font-size: 12px; color: #8a8d91;">&copy; {current_year} Énergie</p>
                        </td>
                    </tr>

                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        quests_done = recap.quests_done,
        level = recap.level_number,
        xp = recap.xp_total,
    )
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recap_contains_figures_and_escapes_name() {
        let recap = DailyRecap {
            email: "nurse@hopital.fr".into(),
            name: Some("<Léa>".into()),
            level_number: 3,
            xp_total: 250,
            profession: Some(("Infirmier·ère".into(), 2)),
            quests_done: 4,
            energy_score: Some(72),
        };
        let html = generate_recap_email_html(&recap);
        assert!(html.contains("Bonsoir &lt;Léa&gt; !"));
        assert!(html.contains("Niveau 2 / 5"));
        assert!(html.contains("72%"));
        assert!(!html.contains("<Léa>"));
    }
}
