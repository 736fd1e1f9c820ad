use crate::record::Platform;

/// What a captured network response looks like to the evidence log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    Video,
    Image,
}

/// Per-platform scrape configuration. The drive/observe/reconcile state
/// machine is shared; only the selectors, wire URL patterns, quality tokens
/// and the in-page extraction script differ per platform family. These are
/// the parts expected to rot and get patched independently.
pub struct ScrapeStrategy {
    pub platform: Platform,
    /// Element whose appearance means the post rendered.
    pub ready_selector: &'static str,
    pub video_url_markers: &'static [&'static str],
    pub image_url_markers: &'static [&'static str],
    /// Resolution tokens, best first; empty means most-recent-wins.
    pub quality_tokens: &'static [&'static str],
    /// Evaluated in the page, returns the candidate shape as a JSON string.
    pub dom_script: &'static str,
    /// Nudge a lazy player with a simulated play() before the DOM pass.
    pub settle_interact: bool,
}

impl ScrapeStrategy {
    /// Classify a network response by content-type and URL shape.
    pub fn classify(&self, url: &str, mime_type: &str) -> Option<Observed> {
        if mime_type.starts_with("video/")
            || self.video_url_markers.iter().any(|m| url.contains(m))
        {
            return Some(Observed::Video);
        }
        if mime_type.starts_with("image/")
            && self.image_url_markers.iter().any(|m| url.contains(m))
        {
            return Some(Observed::Image);
        }
        None
    }
}

pub fn for_platform(platform: Platform) -> Option<&'static ScrapeStrategy> {
    match platform {
        Platform::Twitter => Some(&TWITTER),
        Platform::Tiktok => Some(&TIKTOK),
        // no live-page strategy; primary falls straight to embed mode
        Platform::Instagram => None,
    }
}

static TWITTER: ScrapeStrategy = ScrapeStrategy {
    platform: Platform::Twitter,
    ready_selector: r#"article [data-testid="tweetText"], article video, article img[src*="pbs.twimg.com/media"]"#,
    video_url_markers: &["video.twimg.com"],
    image_url_markers: &["pbs.twimg.com/media"],
    quality_tokens: &["1080x", "720x"],
    dom_script: TWITTER_DOM_SCRIPT,
    settle_interact: false,
};

static TIKTOK: ScrapeStrategy = ScrapeStrategy {
    platform: Platform::Tiktok,
    ready_selector: r#"video, [data-e2e="browse-video"], [data-e2e="browse-user-avatar"]"#,
    video_url_markers: &["/video/tos", "webapp-prime"],
    image_url_markers: &["photomode", "p16-sign"],
    quality_tokens: &[],
    dom_script: TIKTOK_DOM_SCRIPT,
    settle_interact: true,
};

/// Reads the tweet article: visible text and author nodes, media elements
/// (a blob-backed <video> becomes a placeholder for the reconciler), and the
/// engagement counts from the action bar's aria-label. Missing nodes leave
/// their field unset.
const TWITTER_DOM_SCRIPT: &str = r#"
(() => {
  const out = { media: [], stats: {} };
  const article = document.querySelector('article[data-testid="tweet"]')
    || document.querySelector('article');
  if (article) {
    const text = article.querySelector('[data-testid="tweetText"]');
    if (text) out.text = text.innerText;

    const nameLink = article.querySelector('[data-testid="User-Name"] a[href^="/"]');
    if (nameLink) out.author_username = nameLink.getAttribute('href').split('/')[1];
    const nameSpan = article.querySelector('[data-testid="User-Name"] span');
    if (nameSpan) out.author_display_name = nameSpan.innerText;
    const avatar = article.querySelector('img[src*="profile_images"]');
    if (avatar) out.author_avatar = avatar.src;
    out.author_verified = !!article.querySelector('[data-testid="icon-verified"]');

    const time = article.querySelector('time');
    if (time) out.timestamp = time.getAttribute('datetime');

    article.querySelectorAll('video').forEach((v) => {
      const gif = (v.poster || '').includes('tweet_video_thumb');
      const src = v.src && !v.src.startsWith('blob:') ? v.src : '';
      out.media.push({ kind: gif ? 'gif' : 'video', url: src, thumbnail: v.poster || null });
    });
    article.querySelectorAll('img[src*="pbs.twimg.com/media"]').forEach((img) => {
      out.media.push({ kind: 'image', url: img.src, thumbnail: null });
    });

    const group = article.querySelector('[role="group"][aria-label]');
    if (group) {
      const label = group.getAttribute('aria-label') || '';
      const grab = (re) => {
        const m = label.match(re);
        return m ? parseInt(m[1].replace(/,/g, ''), 10) : undefined;
      };
      out.stats.replies = grab(/([\d,]+)\s+repl/i);
      out.stats.reposts = grab(/([\d,]+)\s+(?:repost|retweet)/i);
      out.stats.likes = grab(/([\d,]+)\s+like/i);
      out.stats.views = grab(/([\d,]+)\s+view/i);
    }
  }
  return JSON.stringify(out);
})()
"#;

/// Mines the hydration payload TikTok embeds in the page (current and legacy
/// script ids), falling back to visible <video> elements. Photo-mode posts
/// produce image entries; a blob-backed player produces a placeholder.
const TIKTOK_DOM_SCRIPT: &str = r#"
(() => {
  const out = { media: [], stats: {} };
  const read = (id) => {
    const node = document.getElementById(id);
    if (!node) return null;
    try { return JSON.parse(node.textContent); } catch (e) { return null; }
  };

  let item = null;
  const universal = read('__UNIVERSAL_DATA_FOR_REHYDRATION__');
  if (universal) {
    const scope = universal['__DEFAULT_SCOPE__'] || {};
    const detail = scope['webapp.video-detail'];
    if (detail && detail.itemInfo) item = detail.itemInfo.itemStruct || null;
  }
  if (!item) {
    const sigi = read('SIGI_STATE');
    if (sigi && sigi.ItemModule) {
      const values = Object.values(sigi.ItemModule);
      if (values.length) item = values[0];
    }
  }

  if (item) {
    const author = item.author || {};
    out.author_username = typeof author === 'string' ? author : author.uniqueId;
    out.author_display_name = item.nickname || author.nickname;
    out.author_avatar = item.avatarThumb || author.avatarThumb;
    out.author_verified = !!author.verified;
    out.text = item.desc;
    if (item.createTime) {
      out.timestamp = new Date(Number(item.createTime) * 1000).toISOString();
    }

    const stats = item.stats || {};
    if (stats.diggCount != null) out.stats.likes = Number(stats.diggCount);
    if (stats.shareCount != null) out.stats.reposts = Number(stats.shareCount);
    if (stats.commentCount != null) out.stats.comments = Number(stats.commentCount);
    if (stats.playCount != null) out.stats.views = Number(stats.playCount);

    const images = (item.imagePost && item.imagePost.images) || [];
    images.forEach((img) => {
      const url = img.imageURL && img.imageURL.urlList && img.imageURL.urlList[0];
      if (url) out.media.push({ kind: 'image', url: url, thumbnail: null });
    });
    if (!images.length && item.video) {
      const src = item.video.playAddr || item.video.downloadAddr || '';
      out.media.push({ kind: 'video', url: src, thumbnail: item.video.cover || null });
    }
  }

  if (!out.media.length) {
    document.querySelectorAll('video').forEach((v) => {
      const src = v.src && !v.src.startsWith('blob:') ? v.src : '';
      out.media.push({ kind: 'video', url: src, thumbnail: v.poster || null });
    });
  }
  return JSON.stringify(out);
})()
"#;
