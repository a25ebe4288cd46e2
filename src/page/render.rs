//! HTML rendering of the download page.

use std::fmt::Write;

use crate::platform::Platform;
use crate::version::{PlatformAssets, Version, VersionAsset, latest_version, older_versions};

/// Swaps the neutral layout for the pre-rendered one matching `navigator.platform`.
/// Must classify exactly like [`Platform::detect`].
const REFINE_SCRIPT: &str = r#"(function () {
  var id = (navigator.platform || "").toLowerCase();
  var platform = null;
  if (id.indexOf("windows") !== -1 || id.lastIndexOf("win", 0) === 0) {
    platform = "windows";
  } else if (id.indexOf("linux") !== -1) {
    platform = "linux";
  } else if (id.indexOf("mac") !== -1) {
    platform = "osx";
  }
  if (!platform) return;
  var template = document.getElementById("downloads-" + platform);
  var main = document.getElementById("downloads");
  if (!template || !main) return;
  main.replaceChildren(template.content.cloneNode(true));
  main.setAttribute("data-platform", platform);
})();"#;

pub struct DownloadPage<'a> {
    versions: &'a [Version],
    aur_packages: &'a [String],
}

impl<'a> DownloadPage<'a> {
    pub fn new(versions: &'a [Version], aur_packages: &'a [String]) -> Self {
        Self {
            versions,
            aur_packages,
        }
    }

    /// Renders the full document.
    ///
    /// With [`Platform::Unknown`] the document also carries one template per
    /// known platform and the script that picks one on the client.
    pub fn render_document(&self, platform: Platform) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        html.push_str("<title>Download</title>\n");
        html.push_str("<meta name=\"description\" content=\"Download the newest version or browse the older versions\">\n");
        html.push_str("</head>\n<body>\n");

        let _ = writeln!(
            html,
            "<main id=\"downloads\" data-platform=\"{}\">",
            platform.id()
        );
        html.push_str(&self.render_main(platform));
        html.push_str("</main>\n");

        if platform == Platform::Unknown {
            for known in Platform::KNOWN {
                let _ = writeln!(html, "<template id=\"downloads-{}\">", known.id());
                html.push_str(&self.render_main(known));
                html.push_str("</template>\n");
            }
            let _ = writeln!(html, "<script>\n{}\n</script>", REFINE_SCRIPT);
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    /// Renders the content of the `<main>` element for one platform.
    pub fn render_main(&self, platform: Platform) -> String {
        let latest = latest_version(self.versions);
        let assets = PlatformAssets::find_in(latest);
        let mut html = String::new();

        if platform == Platform::Unknown {
            html.push_str("<h1>Downloads</h1>\n");
        } else {
            let _ = writeln!(
                html,
                "<h1>Download latest version for {}</h1>",
                platform.display_name()
            );
            if let Some(description) = latest.and_then(|v| v.description.as_deref()) {
                let _ = writeln!(html, "<p>{}</p>", escape(description));
            }
            html.push_str(&self.render_platform_block(platform, &assets));
            html.push_str("<h2>Downloads for other operating systems</h2>\n");
            html.push_str(
                "<p>Incorrectly guessed the operating system or just want the download? \
                 You can find them below</p>\n",
            );
        }

        for other in Platform::KNOWN.into_iter().filter(|p| *p != platform) {
            let _ = writeln!(html, "<h3>{}</h3>", other.display_name());
            html.push_str(&self.render_platform_block(other, &assets));
        }

        html.push_str(&self.render_older_versions());
        html
    }

    fn render_platform_block(&self, platform: Platform, assets: &PlatformAssets<'_>) -> String {
        let mut html = String::new();
        match platform {
            Platform::Windows => html.push_str(&button(assets.msi, "Installer")),
            Platform::Osx => html.push_str(&button(assets.dmg, "Executable")),
            Platform::Linux => {
                html.push_str("<h4>Executables</h4>\n");
                html.push_str(&button(assets.app_image, "AppImage"));
                html.push_str("<br>\n");
                html.push_str(&button(assets.deb, "Debian software package"));
                if !self.aur_packages.is_empty() {
                    html.push_str("<h4>Arch Linux</h4>\n");
                    for package in self.aur_packages {
                        let _ = writeln!(
                            html,
                            "<pre><code>yay -S {}</code></pre>",
                            escape(package)
                        );
                    }
                }
            }
            Platform::Unknown => {}
        }
        html
    }

    fn render_older_versions(&self) -> String {
        let mut html = String::new();
        html.push_str("<h2>Older versions</h2>\n<table>\n<thead>\n<tr>");
        for column in [
            "Version",
            "Windows installer",
            "MacOS executable",
            "AppImage",
            "Debian software package",
        ] {
            let _ = write!(html, "<th>{}</th>", column);
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");

        for version in older_versions(self.versions) {
            let assets = PlatformAssets::find(version);
            let _ = write!(html, "<tr><td>{}</td>", escape(&version.tag));
            for asset in [assets.msi, assets.dmg, assets.app_image, assets.deb] {
                let _ = write!(html, "<td>{}</td>", named_link(asset));
            }
            html.push_str("</tr>\n");
        }

        html.push_str("</tbody>\n</table>\n");
        html
    }
}

/// A download button. Without an asset the link stays inert.
fn button(asset: Option<&VersionAsset>, label: &str) -> String {
    match asset {
        Some(asset) => format!(
            "<a href=\"{}\"><button>{}</button></a>\n",
            escape(&asset.url),
            label
        ),
        None => format!("<a><button>{}</button></a>\n", label),
    }
}

fn named_link(asset: Option<&VersionAsset>) -> String {
    match asset {
        Some(asset) => format!(
            "<a href=\"{}\">{}</a>",
            escape(&asset.url),
            escape(&asset.name)
        ),
        None => "<a></a>".to_string(),
    }
}

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> VersionAsset {
        VersionAsset {
            name: name.to_string(),
            url: format!("https://dl.example/{}", name),
        }
    }

    fn version(tag: &str, latest: bool, description: Option<&str>, names: &[&str]) -> Version {
        Version {
            tag: tag.to_string(),
            description: description.map(String::from),
            latest,
            assets: names.iter().map(|n| asset(n)).collect(),
        }
    }

    fn full(tag: &str) -> Vec<String> {
        ["deb", "AppImage", "msi", "dmg", "tar.gz"]
            .iter()
            .map(|ext| format!("app-{}.{}", tag, ext))
            .collect()
    }

    fn sample_versions() -> Vec<Version> {
        let v2 = full("2.0.0");
        let v1 = full("1.0.0");
        vec![
            version(
                "v2.0.0",
                true,
                Some("Fixes <bugs>"),
                &v2.iter().map(String::as_str).collect::<Vec<_>>(),
            ),
            version(
                "v1.0.0",
                false,
                None,
                &v1.iter().map(String::as_str).collect::<Vec<_>>(),
            ),
        ]
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_unknown_platform_shows_all_blocks_without_emphasis() {
        let versions = sample_versions();
        let page = DownloadPage::new(&versions, &[]);
        let html = page.render_main(Platform::Unknown);

        assert!(html.starts_with("<h1>Downloads</h1>"));
        assert!(!html.contains("Download latest version for"));
        assert!(!html.contains("Fixes"));
        assert!(html.contains("<h3>Windows</h3>"));
        assert!(html.contains("<h3>Linux</h3>"));
        assert!(html.contains("<h3>MacOS</h3>"));
        assert!(html.contains(
            "<a href=\"https://dl.example/app-2.0.0.msi\"><button>Installer</button></a>"
        ));
    }

    #[test]
    fn test_known_platform_is_foregrounded() {
        let versions = sample_versions();
        let page = DownloadPage::new(&versions, &[]);
        let html = page.render_main(Platform::Osx);

        assert!(html.starts_with("<h1>Download latest version for MacOS</h1>"));
        assert!(html.contains("<p>Fixes &lt;bugs&gt;</p>"));
        assert!(html.contains("<h2>Downloads for other operating systems</h2>"));
        assert!(!html.contains("<h3>MacOS</h3>"));
        assert!(html.contains("<h3>Windows</h3>"));
        assert!(html.contains("<h3>Linux</h3>"));

        let dmg = html.find("app-2.0.0.dmg").unwrap();
        let other = html.find("Downloads for other operating systems").unwrap();
        assert!(dmg < other);
    }

    #[test]
    fn test_older_versions_table_skips_latest() {
        let versions = sample_versions();
        let page = DownloadPage::new(&versions, &[]);
        let html = page.render_main(Platform::Linux);

        let table = &html[html.find("<h2>Older versions</h2>").unwrap()..];
        assert!(table.contains("<tr><td>v1.0.0</td>"));
        assert!(!table.contains("<td>v2.0.0</td>"));
        assert!(table.contains(
            "<td><a href=\"https://dl.example/app-1.0.0.msi\">app-1.0.0.msi</a></td>\
             <td><a href=\"https://dl.example/app-1.0.0.dmg\">app-1.0.0.dmg</a></td>\
             <td><a href=\"https://dl.example/app-1.0.0.AppImage\">app-1.0.0.AppImage</a></td>\
             <td><a href=\"https://dl.example/app-1.0.0.deb\">app-1.0.0.deb</a></td>"
        ));
    }

    #[test]
    fn test_missing_assets_render_inert_links() {
        let versions = vec![
            version("v2", true, None, &["a.deb", "b.zip", "c.zip", "d.zip", "e.zip"]),
            version("v1", false, None, &["a.msi", "b.zip", "c.zip", "d.zip", "e.zip"]),
        ];
        let page = DownloadPage::new(&versions, &[]);
        let html = page.render_main(Platform::Windows);

        assert!(html.contains("<a><button>Installer</button></a>"));
        assert!(html.contains("<a><button>Executable</button></a>"));
        assert!(html.contains("<a><button>AppImage</button></a>"));
        assert!(html.contains("<tr><td>v1</td><td><a href=\"https://dl.example/a.msi\">a.msi</a></td><td><a></a></td>"));
    }

    #[test]
    fn test_no_latest_version_renders_empty_links() {
        let page = DownloadPage::new(&[], &[]);
        let html = page.render_main(Platform::Linux);

        assert!(html.contains("<a><button>Debian software package</button></a>"));
        assert!(html.contains("<tbody>\n</tbody>"));
    }

    #[test]
    fn test_aur_packages_in_linux_block() {
        let versions = sample_versions();
        let packages = vec!["dust-mail".to_string(), "dust-mail-client".to_string()];
        let page = DownloadPage::new(&versions, &packages);
        let html = page.render_main(Platform::Linux);

        assert!(html.contains("<h4>Arch Linux</h4>"));
        assert!(html.contains("<pre><code>yay -S dust-mail</code></pre>"));
        assert!(html.contains("<pre><code>yay -S dust-mail-client</code></pre>"));
    }

    #[test]
    fn test_document_neutral_includes_templates_and_script() {
        let versions = sample_versions();
        let page = DownloadPage::new(&versions, &[]);
        let html = page.render_document(Platform::Unknown);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<main id=\"downloads\" data-platform=\"unknown\">"));
        for id in ["windows", "linux", "osx"] {
            assert!(html.contains(&format!("<template id=\"downloads-{}\">", id)));
        }
        assert!(html.contains("navigator.platform"));
    }

    #[test]
    fn test_document_refined_has_no_script() {
        let versions = sample_versions();
        let page = DownloadPage::new(&versions, &[]);
        let html = page.render_document(Platform::Windows);

        assert!(html.contains("<main id=\"downloads\" data-platform=\"windows\">"));
        assert!(!html.contains("<template"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_refine_script_covers_every_known_platform() {
        for known in Platform::KNOWN {
            assert!(REFINE_SCRIPT.contains(&format!("platform = \"{}\";", known.id())));
        }
        for keyword in ["\"windows\"", "\"win\"", "\"linux\"", "\"mac\""] {
            assert!(REFINE_SCRIPT.contains(keyword), "missing {}", keyword);
        }
    }
}
