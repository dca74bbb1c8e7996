use teloxide::utils::command::BotCommands;

/// Commands the bot understands.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the search menu")]
    Start,
}

/// Inline buttons shown under the menu message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    SearchMovie,
    SearchBook,
}

impl Button {
    /// Menu order, one button per row.
    pub const ALL: [Button; 2] = [Button::SearchMovie, Button::SearchBook];

    pub fn label(&self) -> &'static str {
        match self {
            Button::SearchMovie => "🎬 Find a movie",
            Button::SearchBook => "📚 Find a book",
        }
    }

    /// Payload carried by the callback query.
    pub fn callback_data(&self) -> &'static str {
        match self {
            Button::SearchMovie => "search_movie",
            Button::SearchBook => "search_book",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.callback_data() == data)
    }

    /// Prompt that replaces the menu once the button is pressed.
    pub fn prompt(&self) -> &'static str {
        match self {
            Button::SearchMovie => "Enter a movie title",
            Button::SearchBook => "Enter a book title",
        }
    }
}
