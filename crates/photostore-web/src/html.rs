//! Minimal server-rendered pages for the landing, listing, and upload form.

use photostore_core::Photo;

/// A photo joined with its public URLs for rendering.
pub struct PhotoView {
    pub photo: Photo,
    pub url: String,
    pub thumbnail_url: String,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_index() -> String {
    page(
        "Photostore",
        "<h1>Photostore</h1>\n<p><a href=\"/photos\">Browse and upload photos</a></p>",
    )
}

pub fn render_photos(photos: &[PhotoView], error: Option<&str>) -> String {
    let mut body = String::from("<h1>Photos</h1>\n");

    body.push_str(
        "<form action=\"/post\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <label>Photo file (jpg, jpeg, png, gif)\n\
         <input type=\"file\" name=\"input_photo\"></label>\n\
         <button type=\"submit\">Upload</button>\n\
         </form>\n",
    );
    if let Some(error) = error {
        body.push_str(&format!(
            "<p class=\"error\">{}</p>\n",
            escape(error)
        ));
    }

    body.push_str("<ul class=\"photos\">\n");
    for view in photos {
        let label = view.photo.label.as_deref().unwrap_or("(no label yet)");
        let image_url = if view.photo.has_thumbnail {
            &view.thumbnail_url
        } else {
            &view.url
        };
        body.push_str(&format!(
            "<li>\n\
             <a href=\"{url}\"><img src=\"{image_url}\" alt=\"{label}\"></a>\n\
             <span>{label}</span>\n\
             <form action=\"/delete\" method=\"post\">\
             <button type=\"submit\" name=\"{id}\">Delete</button>\
             </form>\n\
             </li>\n",
            url = escape(&view.url),
            image_url = escape(image_url),
            label = escape(label),
            id = view.photo.id,
        ));
    }
    body.push_str("</ul>");

    page("Photos", &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_shows_error_and_escapes_labels() {
        let views = vec![PhotoView {
            photo: Photo {
                id: 7,
                filename: "k.cat.png".to_string(),
                label: Some("Cat <tag>".to_string()),
                has_thumbnail: true,
            },
            url: "http://blobs/k.cat.png".to_string(),
            thumbnail_url: "http://blobs/thumbnails/k.cat.png".to_string(),
        }];
        let html = render_photos(&views, Some("Invalid file name"));
        assert!(html.contains("Invalid file name"));
        assert!(html.contains("Cat &lt;tag&gt;"));
        assert!(html.contains("thumbnails/k.cat.png"));
    }

    #[test]
    fn listing_without_thumbnail_links_original() {
        let views = vec![PhotoView {
            photo: Photo {
                id: 1,
                filename: "k.dog.jpg".to_string(),
                label: None,
                has_thumbnail: false,
            },
            url: "http://blobs/k.dog.jpg".to_string(),
            thumbnail_url: "http://blobs/thumbnails/k.dog.jpg".to_string(),
        }];
        let html = render_photos(&views, None);
        assert!(html.contains("img src=\"http://blobs/k.dog.jpg\""));
        assert!(html.contains("(no label yet)"));
    }
}
