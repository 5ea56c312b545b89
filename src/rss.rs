use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::header::USER_AGENT;

use crate::api::models::{Enclosure, Feed, FeedItem};
use crate::error::{AppError, Result};
use crate::HTTP_CLIENT;

/// Fetch a user's Medium RSS feed and normalize it.
pub async fn fetch_feed(username: &str) -> Result<(Feed, Vec<FeedItem>)> {
    let url = format!("https://medium.com/feed/@{}", username);

    let response = HTTP_CLIENT
        .get(&url)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .await
        .map_err(|e| AppError::MediumFetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::MediumFetch(format!("HTTP {} from {}", status, url)));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| AppError::MediumFetch(e.to_string()))?;

    parse_feed(&body, &url)
}

#[derive(Default)]
struct ChannelBuilder {
    title: Option<String>,
    link: Option<String>,
    author: Option<String>,
    description: Option<String>,
    image: Option<String>,
}

impl ChannelBuilder {
    fn build(self, feed_url: &str) -> Feed {
        Feed {
            url: feed_url.to_string(),
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
        }
    }
}

#[derive(Default)]
struct ItemBuilder {
    title: Option<String>,
    pub_date: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    author: Option<String>,
    description: Option<String>,
    content: Option<String>,
    categories: Vec<String>,
}

impl ItemBuilder {
    fn build(self, feed_author: &str) -> FeedItem {
        FeedItem {
            title: self.title.unwrap_or_default(),
            pub_date: self.pub_date.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            guid: self.guid.unwrap_or_default(),
            // Items without their own byline inherit the feed author
            author: self.author.unwrap_or_else(|| feed_author.to_string()),
            thumbnail: String::new(),
            description: self.description.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            enclosure: Enclosure::default(),
            categories: self.categories,
        }
    }
}

// First matching element wins; later siblings are ignored.
fn set_first(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Parse an RSS document into the normalized feed shape.
///
/// Items keep document order. Scalar fields take the first matching
/// element; `category` elements accumulate. The guid value is the text
/// content of the node whether or not it carries attributes.
pub fn parse_feed(xml: &[u8], feed_url: &str) -> Result<(Feed, Vec<FeedItem>)> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut channel = ChannelBuilder::default();
    let mut item_builders: Vec<ItemBuilder> = Vec::new();
    let mut current_item: Option<ItemBuilder> = None;
    let mut current_element = String::new();
    let mut saw_channel = false;
    let mut in_channel = false;
    let mut in_image = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "channel" => {
                        saw_channel = true;
                        in_channel = true;
                    }
                    "image" if in_channel && current_item.is_none() => in_image = true,
                    "item" if in_channel => current_item = Some(ItemBuilder::default()),
                    _ => {}
                }
                current_element = name;
            }
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"channel" => in_channel = false,
                    b"image" => in_image = false,
                    b"item" => {
                        if let Some(builder) = current_item.take() {
                            item_builders.push(builder);
                        }
                    }
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| AppError::RssParse(e.to_string()))?
                    .to_string();
                apply_text(
                    &current_element,
                    text,
                    &mut channel,
                    &mut current_item,
                    in_channel,
                    in_image,
                );
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                apply_text(
                    &current_element,
                    text,
                    &mut channel,
                    &mut current_item,
                    in_channel,
                    in_image,
                );
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AppError::RssParse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    if !saw_channel {
        return Err(AppError::RssParse("document has no <channel> element".to_string()));
    }

    let feed = channel.build(feed_url);
    let items = item_builders
        .into_iter()
        .map(|builder| builder.build(&feed.author))
        .collect();

    Ok((feed, items))
}

fn apply_text(
    current_element: &str,
    text: String,
    channel: &mut ChannelBuilder,
    current_item: &mut Option<ItemBuilder>,
    in_channel: bool,
    in_image: bool,
) {
    if text.is_empty() {
        return;
    }

    if let Some(item) = current_item {
        match current_element {
            "title" => set_first(&mut item.title, text),
            "pubDate" => set_first(&mut item.pub_date, text),
            "link" => set_first(&mut item.link, text),
            "guid" => set_first(&mut item.guid, text),
            "dc:creator" => set_first(&mut item.author, text),
            "description" => set_first(&mut item.description, text),
            "content:encoded" => set_first(&mut item.content, text),
            "category" => item.categories.push(text),
            _ => {}
        }
    } else if in_image {
        if current_element == "url" {
            set_first(&mut channel.image, text);
        }
    } else if in_channel {
        match current_element {
            "title" => set_first(&mut channel.title, text),
            "link" => set_first(&mut channel.link, text),
            "dc:creator" => set_first(&mut channel.author, text),
            "description" => set_first(&mut channel.description, text),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_URL: &str = "https://medium.com/feed/@janedoe";

    fn feed_with_items(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:content="http://purl.org/rss/1.0/modules/content/" version="2.0">
  <channel>
    <title><![CDATA[Stories by Jane Doe on Medium]]></title>
    <description><![CDATA[Stories by Jane Doe on Medium]]></description>
    <link>https://medium.com/@janedoe</link>
    <image>
      <url>https://cdn-images.medium.com/fit/c/150/150/1*abc.jpeg</url>
      <title>Stories by Jane Doe on Medium</title>
      <link>https://medium.com/@janedoe</link>
    </image>
    <dc:creator>Jane Doe</dc:creator>
    {items}
  </channel>
</rss>"#
        )
    }

    #[test]
    fn parses_channel_metadata() {
        let xml = feed_with_items("");
        let (feed, items) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        assert_eq!(feed.url, FEED_URL);
        assert_eq!(feed.title, "Stories by Jane Doe on Medium");
        assert_eq!(feed.link, "https://medium.com/@janedoe");
        assert_eq!(feed.author, "Jane Doe");
        assert_eq!(feed.description, "Stories by Jane Doe on Medium");
        assert_eq!(
            feed.image,
            "https://cdn-images.medium.com/fit/c/150/150/1*abc.jpeg"
        );
        assert!(items.is_empty());
    }

    #[test]
    fn items_preserve_document_order() {
        let xml = feed_with_items(
            r#"<item><title>first</title></item>
               <item><title>second</title></item>
               <item><title>third</title></item>"#,
        );
        let (_, items) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        let titles: Vec<&str> = items.iter().map(|it| it.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn item_author_falls_back_to_channel_creator() {
        let xml = feed_with_items(
            r#"<item><title>signed</title><dc:creator>Guest Author</dc:creator></item>
               <item><title>unsigned</title></item>"#,
        );
        let (_, items) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        assert_eq!(items[0].author, "Guest Author");
        assert_eq!(items[1].author, "Jane Doe");
    }

    #[test]
    fn missing_channel_image_defaults_to_empty() {
        let xml = r#"<rss><channel>
            <title>No image here</title>
            <link>https://example.com</link>
          </channel></rss>"#;
        let (feed, _) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        assert_eq!(feed.image, "");
        assert_eq!(feed.author, "");
    }

    #[test]
    fn image_block_does_not_leak_into_channel_fields() {
        let xml = r#"<rss><channel>
            <image>
              <url>https://example.com/logo.png</url>
              <title>logo title</title>
              <link>https://example.com/logo-link</link>
            </image>
            <title>channel title</title>
            <link>https://example.com</link>
          </channel></rss>"#;
        let (feed, _) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        assert_eq!(feed.title, "channel title");
        assert_eq!(feed.link, "https://example.com");
        assert_eq!(feed.image, "https://example.com/logo.png");
    }

    #[test]
    fn guid_text_is_read_from_attributed_node() {
        let xml = feed_with_items(
            r#"<item><guid isPermaLink="false">https://medium.com/p/abc123</guid></item>
               <item><guid>plain-guid</guid></item>"#,
        );
        let (_, items) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        assert_eq!(items[0].guid, "https://medium.com/p/abc123");
        assert_eq!(items[1].guid, "plain-guid");
    }

    #[test]
    fn full_item_fields_are_extracted() {
        let xml = feed_with_items(
            r#"<item>
              <title><![CDATA[First post]]></title>
              <link>https://medium.com/@janedoe/first</link>
              <guid isPermaLink="false">https://medium.com/p/abc123</guid>
              <category><![CDATA[rust]]></category>
              <category><![CDATA[web]]></category>
              <pubDate>Tue, 05 Aug 2025 16:12:03 GMT</pubDate>
              <description><![CDATA[A short teaser]]></description>
              <content:encoded><![CDATA[<p>Hello, <b>world</b></p>]]></content:encoded>
            </item>"#,
        );
        let (_, items) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        let item = &items[0];
        assert_eq!(item.title, "First post");
        assert_eq!(item.link, "https://medium.com/@janedoe/first");
        assert_eq!(item.pub_date, "Tue, 05 Aug 2025 16:12:03 GMT");
        assert_eq!(item.description, "A short teaser");
        assert_eq!(item.content, "<p>Hello, <b>world</b></p>");
        assert_eq!(item.categories, ["rust", "web"]);
        assert_eq!(item.thumbnail, "");
    }

    #[test]
    fn missing_optional_item_fields_default_to_empty() {
        let xml = feed_with_items(r#"<item><title>bare</title></item>"#);
        let (_, items) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        let item = &items[0];
        assert_eq!(item.pub_date, "");
        assert_eq!(item.link, "");
        assert_eq!(item.guid, "");
        assert_eq!(item.description, "");
        assert_eq!(item.content, "");
        assert!(item.categories.is_empty());
    }

    #[test]
    fn author_fallback_applies_when_channel_creator_follows_items() {
        let xml = r#"<rss xmlns:dc="http://purl.org/dc/elements/1.1/"><channel>
            <title>late byline</title>
            <item><title>unsigned</title></item>
            <dc:creator>Jane Doe</dc:creator>
          </channel></rss>"#;
        let (feed, items) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();

        assert_eq!(feed.author, "Jane Doe");
        assert_eq!(items[0].author, "Jane Doe");
    }

    #[test]
    fn feed_with_no_items_yields_empty_list() {
        let xml = r#"<rss><channel><title>quiet</title></channel></rss>"#;
        let (_, items) = parse_feed(xml.as_bytes(), FEED_URL).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let xml = b"<rss><channel><item></channel></rss>";
        let err = parse_feed(xml, FEED_URL).unwrap_err();
        assert!(matches!(err, AppError::RssParse(_)));
    }

    #[test]
    fn document_without_channel_is_a_parse_error() {
        let err = parse_feed(b"<not-rss></not-rss>", FEED_URL).unwrap_err();
        assert!(matches!(err, AppError::RssParse(_)));
    }
}
