use crate::models::GifImage;

// Which pager controls the frontend should draw. Previous disappears on
// the first page, next on the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerVisibility {
    pub previous: bool,
    pub next: bool,
}

// Modal viewer state: the held gif list, a 1-based page index (0 while
// nothing is shown) and the open flag. Holds no display handles, the
// frontend renders from the accessors each frame.
pub struct Lightbox {
    gifs: Vec<GifImage>,
    page: usize,
    open: bool,
}

impl Lightbox {
    pub fn new() -> Self {
        Self {
            gifs: Vec::new(),
            page: 0,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn page(&self) -> usize {
        self.page
    }

    #[allow(dead_code)]
    pub fn gif_count(&self) -> usize {
        self.gifs.len()
    }

    // Replaces the held collection. Open state and page index are left
    // alone; callers page explicitly once data is in place.
    pub fn set_gifs(&mut self, gifs: Vec<GifImage>) {
        self.gifs = gifs;
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.page = 0;
        self.gifs.clear();
    }

    // Applies a signed page delta, keeping the result inside [1, N]. With
    // no data the index stays pinned at 0, so navigation can never land
    // out of bounds.
    pub fn turn_page(&mut self, delta: i64) {
        if self.gifs.is_empty() {
            self.page = 0;
            return;
        }

        let target = self.page as i64 + delta;
        self.page = target.clamp(1, self.gifs.len() as i64) as usize;
    }

    pub fn current_gif(&self) -> Option<&GifImage> {
        if self.page == 0 {
            return None;
        }

        self.gifs.get(self.page - 1)
    }

    pub fn title_text(&self) -> String {
        format!("Gif {} of {}", self.page, self.gifs.len())
    }

    pub fn source_text(&self) -> String {
        match self.current_gif() {
            Some(gif) => format!("Source: {}", gif.source),
            None => String::new(),
        }
    }

    pub fn pager_visibility(&self) -> PagerVisibility {
        PagerVisibility {
            previous: self.page > 1,
            next: self.page < self.gifs.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gifs(count: usize) -> Vec<GifImage> {
        (1..=count)
            .map(|i| GifImage {
                url: format!("https://media.test/{}.gif", i),
                source: format!("source{}.com", i),
            })
            .collect()
    }

    fn opened_with(count: usize) -> Lightbox {
        let mut lightbox = Lightbox::new();
        lightbox.open();
        lightbox.set_gifs(gifs(count));
        lightbox.turn_page(1);
        lightbox
    }

    #[test]
    fn starts_closed_and_empty() {
        let lightbox = Lightbox::new();

        assert!(!lightbox.is_open());
        assert_eq!(lightbox.page(), 0);
        assert_eq!(lightbox.current_gif(), None);
    }

    #[test]
    fn first_page_hides_previous() {
        let lightbox = opened_with(3);

        assert_eq!(lightbox.page(), 1);
        assert_eq!(
            lightbox.pager_visibility(),
            PagerVisibility {
                previous: false,
                next: true,
            }
        );
    }

    #[test]
    fn middle_page_shows_both_controls() {
        let mut lightbox = opened_with(3);
        lightbox.turn_page(1);

        assert_eq!(lightbox.page(), 2);
        assert_eq!(
            lightbox.pager_visibility(),
            PagerVisibility {
                previous: true,
                next: true,
            }
        );
    }

    #[test]
    fn last_page_hides_next() {
        let mut lightbox = opened_with(3);
        lightbox.turn_page(2);

        assert_eq!(lightbox.page(), 3);
        assert_eq!(
            lightbox.pager_visibility(),
            PagerVisibility {
                previous: true,
                next: false,
            }
        );
    }

    #[test]
    fn single_gif_hides_both_controls() {
        let lightbox = opened_with(1);

        assert_eq!(
            lightbox.pager_visibility(),
            PagerVisibility {
                previous: false,
                next: false,
            }
        );
    }

    #[test]
    fn out_of_range_deltas_are_clamped() {
        let mut lightbox = opened_with(3);

        lightbox.turn_page(10);
        assert_eq!(lightbox.page(), 3);

        lightbox.turn_page(-10);
        assert_eq!(lightbox.page(), 1);
    }

    #[test]
    fn paging_with_no_data_stays_at_zero() {
        let mut lightbox = Lightbox::new();
        lightbox.open();

        lightbox.turn_page(1);

        assert_eq!(lightbox.page(), 0);
        assert_eq!(lightbox.current_gif(), None);
        assert_eq!(
            lightbox.pager_visibility(),
            PagerVisibility {
                previous: false,
                next: false,
            }
        );
    }

    #[test]
    fn close_resets_page_and_data() {
        let mut lightbox = opened_with(3);
        lightbox.turn_page(1);

        lightbox.close();

        assert!(!lightbox.is_open());
        assert_eq!(lightbox.page(), 0);
        assert_eq!(lightbox.gif_count(), 0);
        assert_eq!(lightbox.source_text(), "");
    }

    #[test]
    fn reopen_after_close_lands_on_page_one() {
        let mut lightbox = opened_with(3);
        lightbox.close();

        lightbox.open();
        assert_eq!(lightbox.page(), 0);

        lightbox.set_gifs(gifs(3));
        lightbox.turn_page(1);

        assert_eq!(lightbox.page(), 1);
        assert_eq!(lightbox.title_text(), "Gif 1 of 3");
    }

    #[test]
    fn setting_same_data_twice_renders_identically() {
        let mut lightbox = opened_with(3);

        lightbox.set_gifs(gifs(3));
        lightbox.turn_page(0);
        let first = (
            lightbox.page(),
            lightbox.title_text(),
            lightbox.source_text(),
        );

        lightbox.set_gifs(gifs(3));
        lightbox.turn_page(0);
        let second = (
            lightbox.page(),
            lightbox.title_text(),
            lightbox.source_text(),
        );

        assert_eq!(first, second);
    }

    #[test]
    fn title_and_source_follow_current_page() {
        let mut lightbox = opened_with(2);
        lightbox.turn_page(1);

        assert_eq!(lightbox.title_text(), "Gif 2 of 2");
        assert_eq!(lightbox.source_text(), "Source: source2.com");
        assert_eq!(
            lightbox.current_gif().map(|gif| gif.url.as_str()),
            Some("https://media.test/2.gif")
        );
    }
}
