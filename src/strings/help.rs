//! # Help Text
//!
//! Detailed help messages and documentation for bot commands.
//! Displayed to the user via the `.help` command.

pub const MAIN: &str = concat!(
    "**☕ Barista Help**\n",
    "Use: .command _args_\n",
    "\n",
    "**Session**\n",
    "* create [votes]: Start a Lean Coffee (you become coordinator)\n",
    "* finalize: Lock votes and rank topics\n",
    "* abort: End the session early\n",
    "\n",
    "**Topics**\n",
    "* `# My topic`: Propose a topic (H1 message)\n",
    "* React to a topic message to vote for it; remove the reaction to unvote\n",
    "* Delete your topic message to withdraw it\n",
    "\n",
    "**Discussion**\n",
    "* next [minutes]: Open the next discussion slot\n",
    "* 👍 / 👎 on the continue question decide whether to keep going\n",
    "* queue: Topics still to discuss\n",
    "* summary: Topics already discussed\n",
    "* status: Session status\n"
);
